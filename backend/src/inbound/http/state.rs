//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised against in-memory or mocked implementations.

use std::sync::Arc;

use crate::domain::ports::{LoginService, RecipeCommand, RecipeQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Recipe mutations and votes.
    pub recipes: Arc<dyn RecipeCommand>,
    /// Recipe reads.
    pub recipes_query: Arc<dyn RecipeQuery>,
    /// Credential checks for `/login`.
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    /// Bundle the ports.
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use recipes::domain::RecipeService;
    /// use recipes::domain::ports::FixtureLoginService;
    /// use recipes::inbound::http::state::HttpState;
    /// use recipes::outbound::memory::InMemoryRecipeRepository;
    ///
    /// let service = Arc::new(RecipeService::new(
    ///     Arc::new(InMemoryRecipeRepository::default()),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(service.clone(), service, Arc::new(FixtureLoginService));
    /// let _login = state.login.clone();
    /// ```
    pub fn new(
        recipes: Arc<dyn RecipeCommand>,
        recipes_query: Arc<dyn RecipeQuery>,
        login: Arc<dyn LoginService>,
    ) -> Self {
        Self {
            recipes,
            recipes_query,
            login,
        }
    }
}
