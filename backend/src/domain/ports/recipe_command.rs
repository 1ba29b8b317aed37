//! Driving port for recipe mutations.
//!
//! Inbound adapters pass the caller's identity explicitly with every request;
//! `None` means the caller is anonymous. Authorisation happens behind the
//! port.

use async_trait::async_trait;

use crate::domain::{Error, RecipeDetail, RecipeId, RecipeInput, UserId, VotePolarity, VoteTally};

/// Request to create a recipe.
#[derive(Debug, Clone)]
pub struct CreateRecipeRequest {
    /// The signed-in caller, who becomes the author.
    pub user: Option<UserId>,
    /// Unvalidated recipe fields.
    pub input: RecipeInput,
}

/// Request to edit a recipe.
#[derive(Debug, Clone)]
pub struct UpdateRecipeRequest {
    /// Recipe to edit.
    pub recipe_id: RecipeId,
    /// The signed-in caller; must be the author.
    pub user: Option<UserId>,
    /// Unvalidated replacement fields.
    pub input: RecipeInput,
}

/// Request to delete a recipe.
#[derive(Debug, Clone)]
pub struct DeleteRecipeRequest {
    /// Recipe to delete.
    pub recipe_id: RecipeId,
    /// The signed-in caller; must be the author.
    pub user: Option<UserId>,
}

/// Request to cast or withdraw a vote.
#[derive(Debug, Clone)]
pub struct CastVoteRequest {
    /// Recipe being voted on.
    pub recipe_id: RecipeId,
    /// The signed-in caller.
    pub user: Option<UserId>,
    /// Polarity of the vote button pressed.
    pub polarity: VotePolarity,
}

/// Driving port for recipe mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeCommand: Send + Sync {
    /// Create a recipe authored by the caller.
    ///
    /// # Errors
    ///
    /// Unauthorized when anonymous; InvalidRequest with per-field details
    /// when the input fails validation.
    async fn create(&self, request: CreateRecipeRequest) -> Result<RecipeDetail, Error>;

    /// Edit a recipe's content.
    ///
    /// # Errors
    ///
    /// NotFound, Unauthorized, Forbidden for non-authors, or InvalidRequest.
    async fn update(&self, request: UpdateRecipeRequest) -> Result<RecipeDetail, Error>;

    /// Delete a recipe and its votes.
    ///
    /// # Errors
    ///
    /// NotFound, Unauthorized or Forbidden for non-authors.
    async fn delete(&self, request: DeleteRecipeRequest) -> Result<(), Error>;

    /// Toggle the caller's vote and return the recipe's new counts.
    ///
    /// # Errors
    ///
    /// Unauthorized when anonymous, NotFound for unknown recipes, and
    /// ServiceUnavailable when concurrent voting kept winning every retry.
    async fn cast_vote(&self, request: CastVoteRequest) -> Result<VoteTally, Error>;
}
