//! Port for recipe and vote persistence.
//!
//! Adapters store recipes together with one vote row per `(recipe, user)`.
//! Vote counts are always derived from those rows; no adapter keeps a
//! denormalised counter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Recipe, RecipeContent, RecipeId, RecipeListQuery, RecipePage, RecipeSummary, UserId,
    VotePolarity, VoteState, VoteTally,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "recipe repository query failed: {message}",
        /// The referenced recipe does not exist.
        NotFound { recipe_id: String } =>
            "recipe not found: {recipe_id}",
        /// A concurrent transaction won a race; the operation may be retried.
        Conflict { message: String } =>
            "recipe repository conflict: {message}",
    }
}

/// Port for recipe storage and vote bookkeeping.
///
/// # Vote semantics
///
/// [`RecipeRepository::toggle_vote`] reads the caller's current
/// [`VoteState`], applies [`VoteState::toggle`], writes the outcome and
/// returns fresh counts, all as one atomic step per recipe. Two concurrent
/// toggles on the same recipe must never both observe the same prior state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Store a new recipe written by `author`, stamped with `now`.
    async fn create(
        &self,
        author: &UserId,
        content: &RecipeContent,
        now: DateTime<Utc>,
    ) -> Result<Recipe, RecipeRepositoryError>;

    /// Fetch a recipe with its vote counts.
    ///
    /// Returns `None` when no recipe has the given id.
    async fn find(&self, id: &RecipeId) -> Result<Option<RecipeSummary>, RecipeRepositoryError>;

    /// Replace a recipe's content and refresh `updated_at`.
    ///
    /// The author is never written. Fails with
    /// [`RecipeRepositoryError::NotFound`] when the recipe is absent.
    async fn update(
        &self,
        id: &RecipeId,
        content: &RecipeContent,
        now: DateTime<Utc>,
    ) -> Result<RecipeSummary, RecipeRepositoryError>;

    /// Remove a recipe and all of its votes.
    ///
    /// Returns `Ok(false)` when the recipe did not exist.
    async fn delete(&self, id: &RecipeId) -> Result<bool, RecipeRepositoryError>;

    /// Run a list query: filter, sort, then cut one clamped page.
    async fn list(&self, query: &RecipeListQuery) -> Result<RecipePage, RecipeRepositoryError>;

    /// Toggle `user`'s vote on a recipe and return the new counts.
    async fn toggle_vote(
        &self,
        id: &RecipeId,
        user: &UserId,
        polarity: VotePolarity,
    ) -> Result<VoteTally, RecipeRepositoryError>;

    /// Current vote held by `user` on a recipe.
    async fn vote_state(
        &self,
        id: &RecipeId,
        user: &UserId,
    ) -> Result<VoteState, RecipeRepositoryError>;
}
