//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod recipe_command;
mod recipe_query;
mod recipe_repository;

#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{
    DisabledLoginService, FIXTURE_ACCOUNTS, FixtureAccount, FixtureLoginService, LoginService,
};
#[cfg(test)]
pub use recipe_command::MockRecipeCommand;
pub use recipe_command::{
    CastVoteRequest, CreateRecipeRequest, DeleteRecipeRequest, RecipeCommand, UpdateRecipeRequest,
};
#[cfg(test)]
pub use recipe_query::MockRecipeQuery;
pub use recipe_query::RecipeQuery;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipeRepository, RecipeRepositoryError};
