//! Selects the recipe store and assembles handler state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use recipes::domain::RecipeService;
use recipes::domain::ports::{
    DisabledLoginService, FixtureLoginService, LoginService, RecipeRepository,
};
use recipes::inbound::http::session_config::BuildMode;
use recipes::inbound::http::state::HttpState;
use recipes::outbound::memory::InMemoryRecipeRepository;
use recipes::outbound::persistence::{DbPool, DieselRecipeRepository};

use super::ServerConfig;

/// Wire one recipe service over `repo` for both driving ports.
fn http_state_over<R>(
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    login: Arc<dyn LoginService>,
    vote_retry_attempts: u32,
) -> HttpState
where
    R: RecipeRepository + 'static,
{
    let service =
        Arc::new(RecipeService::new(repo, clock).with_vote_retry_attempts(vote_retry_attempts));
    HttpState::new(service.clone(), service, login)
}

/// Choose the authenticator for a deployment.
///
/// Fixture accounts are only accepted without a database or in debug builds.
fn login_service_for(has_pool: bool, mode: BuildMode) -> Arc<dyn LoginService> {
    if has_pool && mode == BuildMode::Release {
        warn!("no identity provider configured; fixture logins are disabled");
        Arc::new(DisabledLoginService)
    } else {
        Arc::new(FixtureLoginService)
    }
}

pub(super) fn build_with_pool(
    pool: Option<&DbPool>,
    clock: Arc<dyn Clock>,
    vote_retry_attempts: u32,
    mode: BuildMode,
) -> HttpState {
    let login = login_service_for(pool.is_some(), mode);
    match pool {
        Some(pool) => {
            info!("recipes stored in PostgreSQL");
            http_state_over(
                Arc::new(DieselRecipeRepository::new(pool.clone())),
                clock,
                login,
                vote_retry_attempts,
            )
        }
        None => {
            warn!("no database configured; recipes are kept in memory and lost on restart");
            http_state_over(
                Arc::new(InMemoryRecipeRepository::default()),
                clock,
                login,
                vote_retry_attempts,
            )
        }
    }
}

/// Build the shared HTTP state for `config`.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(build_with_pool(
        config.db_pool.as_ref(),
        Arc::new(DefaultClock),
        config.vote_retry_attempts,
        BuildMode::from_debug_assertions(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipes::domain::ports::{CastVoteRequest, CreateRecipeRequest, FIXTURE_ACCOUNTS};
    use recipes::domain::{LoginCredentials, RecipeInput, RecipeListQuery, VotePolarity, VoteTally};
    use rstest::rstest;

    fn input() -> RecipeInput {
        RecipeInput {
            title: "Soda bread".to_owned(),
            description: "No yeast needed".to_owned(),
            ingredients: "flour, buttermilk, soda, salt".to_owned(),
            instructions: "Mix and bake".to_owned(),
            image: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn missing_pool_falls_back_to_memory() {
        let state = build_with_pool(None, Arc::new(DefaultClock), 3, BuildMode::Release);
        let alice = FIXTURE_ACCOUNTS[0];

        let created = state
            .recipes
            .create(CreateRecipeRequest {
                user: Some(alice.user_id),
                input: input(),
            })
            .await
            .expect("create in memory");
        let tally = state
            .recipes
            .cast_vote(CastVoteRequest {
                recipe_id: created.summary.recipe.id(),
                user: Some(alice.user_id),
                polarity: VotePolarity::Up,
            })
            .await
            .expect("vote in memory");
        assert_eq!(tally, VoteTally::new(1, 0));

        let page = state
            .recipes_query
            .list(RecipeListQuery::from_raw(None, None, None).expect("default query"))
            .await
            .expect("list in memory");
        assert_eq!(page.items().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_accounts_can_log_in() {
        let state = build_with_pool(None, Arc::new(DefaultClock), 3, BuildMode::Release);
        let bob = FIXTURE_ACCOUNTS[1];
        let credentials =
            LoginCredentials::try_from_parts(bob.username, bob.password).expect("credentials");

        let user = state
            .login
            .authenticate(&credentials)
            .await
            .expect("fixture login");
        assert_eq!(user, bob.user_id);
    }

    #[rstest]
    #[case(false, BuildMode::Release, true)]
    #[case(false, BuildMode::Debug, true)]
    #[case(true, BuildMode::Debug, true)]
    #[case(true, BuildMode::Release, false)]
    #[tokio::test]
    async fn fixture_logins_need_no_pool_or_a_debug_build(
        #[case] has_pool: bool,
        #[case] mode: BuildMode,
        #[case] accepted: bool,
    ) {
        let alice = FIXTURE_ACCOUNTS[0];
        let credentials =
            LoginCredentials::try_from_parts(alice.username, alice.password).expect("credentials");

        let result = login_service_for(has_pool, mode)
            .authenticate(&credentials)
            .await;
        assert_eq!(result.is_ok(), accepted);
    }
}
