//! Session extractor exposing the caller's identity to handlers.
//!
//! Handlers never touch Actix session APIs directly; they ask for an
//! optional [`UserId`] (anonymous reads) or require one (mutations).

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Wrapper around the Actix session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record `user_id` as the authenticated caller.
    ///
    /// The session is renewed first so a pre-login cookie cannot be reused.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The authenticated caller, if any.
    ///
    /// A tampered or stale id is treated as anonymous.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|value| match UserId::new(&value) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "ignoring invalid user id in session cookie");
                None
            }
        }))
    }

    /// The authenticated caller, or `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Forget the caller and drop the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    const ALICE: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn session_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/login",
                web::get().to(|session: SessionContext| async move {
                    let id = UserId::new(ALICE).expect("fixture id");
                    session.persist_user(&id)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/tamper",
                web::get().to(|session: Session| async move {
                    session
                        .insert(USER_ID_KEY, "not-a-uuid")
                        .expect("insert raw value");
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/whoami",
                web::get().to(|session: SessionContext| async move {
                    let body = session
                        .user_id()?
                        .map_or_else(|| "anonymous".to_owned(), |id| id.to_string());
                    Ok::<_, Error>(HttpResponse::Ok().body(body))
                }),
            )
            .route(
                "/private",
                web::get().to(|session: SessionContext| async move {
                    session.require_user_id()?;
                    Ok::<_, Error>(HttpResponse::NoContent())
                }),
            )
    }

    #[rstest]
    #[actix_web::test]
    async fn persisted_user_is_read_back() {
        let app = test::init_service(session_app()).await;
        let login =
            test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = session_cookie(&login);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(test::read_body(res).await, ALICE);
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_callers_read_as_none_and_are_refused_mutations() {
        let app = test::init_service(session_app()).await;

        let whoami =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(test::read_body(whoami).await, "anonymous");

        let private =
            test::call_service(&app, test::TestRequest::get().uri("/private").to_request()).await;
        assert_eq!(private.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn tampered_ids_are_treated_as_anonymous() {
        let app = test::init_service(session_app()).await;
        let tamper =
            test::call_service(&app, test::TestRequest::get().uri("/tamper").to_request()).await;
        let cookie = session_cookie(&tamper);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/private").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
