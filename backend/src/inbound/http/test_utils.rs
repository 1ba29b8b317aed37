//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::web;
use mockable::DefaultClock;

use crate::domain::RecipeService;
use crate::domain::ports::FixtureLoginService;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryRecipeRepository;

/// Cookie-backed session middleware with a fresh key and `Secure` off so
/// plain-HTTP test requests keep their cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `response`.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Handler state over an empty in-memory store and the fixture accounts.
pub fn in_memory_state() -> web::Data<HttpState> {
    let service = Arc::new(RecipeService::new(
        Arc::new(InMemoryRecipeRepository::default()),
        Arc::new(DefaultClock),
    ));
    web::Data::new(HttpState::new(
        service.clone(),
        service,
        Arc::new(FixtureLoginService),
    ))
}
