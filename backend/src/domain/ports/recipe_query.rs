//! Driving port for recipe reads.

use async_trait::async_trait;

use crate::domain::{Error, RecipeDetail, RecipeId, RecipeListQuery, RecipePage, UserId};

/// Domain use-case port for listing and viewing recipes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeQuery: Send + Sync {
    /// Fetch one page of recipes.
    async fn list(&self, query: RecipeListQuery) -> Result<RecipePage, Error>;

    /// Fetch a single recipe as seen by `viewer`.
    ///
    /// Anonymous viewers see no vote of their own.
    async fn detail(&self, recipe_id: RecipeId, viewer: Option<UserId>)
    -> Result<RecipeDetail, Error>;
}
