//! HTTP inbound adapter exposing the recipe site's endpoints.

pub mod error;
pub mod health;
pub mod recipes;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod votes;

use actix_web::web;

pub use error::ApiResult;

/// Register the recipe, vote and user handlers with their extractor
/// configuration.
///
/// Health probes are registered separately because they need their own
/// state.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::query_config())
        .service(recipes::list_recipes)
        .service(recipes::create_recipe)
        .service(recipes::recipe_detail)
        .service(recipes::update_recipe)
        .service(recipes::delete_recipe)
        .service(votes::upvote)
        .service(votes::downvote)
        .service(users::login)
        .service(users::logout);
}
