//! Process-local `RecipeRepository` for development and tests.
//!
//! Every operation takes the store lock for its whole duration, so a vote
//! toggle's read and write can never interleave with another toggle. Data is
//! lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    Recipe, RecipeContent, RecipeId, RecipeListQuery, RecipePage, RecipeSummary, UserId,
    VotePolarity, VoteState, VoteTally,
};

#[derive(Debug, Clone)]
struct StoredRecipe {
    recipe: Recipe,
    votes: HashMap<UserId, VotePolarity>,
}

impl StoredRecipe {
    fn tally(&self) -> VoteTally {
        VoteTally::count(
            self.votes
                .values()
                .map(|polarity| VoteState::from(Some(*polarity))),
        )
    }

    fn summary(&self) -> RecipeSummary {
        RecipeSummary::new(self.recipe.clone(), self.tally())
    }

    fn vote_of(&self, user: &UserId) -> VoteState {
        VoteState::from(self.votes.get(user).copied())
    }
}

/// In-memory implementation of the `RecipeRepository` port.
#[derive(Debug, Default)]
pub struct InMemoryRecipeRepository {
    store: RwLock<HashMap<RecipeId, StoredRecipe>>,
}

impl InMemoryRecipeRepository {
    /// Number of stored recipes.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

fn not_found(id: &RecipeId) -> RecipeRepositoryError {
    RecipeRepositoryError::not_found(id.to_string())
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn create(
        &self,
        author: &UserId,
        content: &RecipeContent,
        now: DateTime<Utc>,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let recipe = Recipe::new(RecipeId::random(), *author, content.clone(), now, now);
        self.store.write().await.insert(
            recipe.id(),
            StoredRecipe {
                recipe: recipe.clone(),
                votes: HashMap::new(),
            },
        );
        Ok(recipe)
    }

    async fn find(&self, id: &RecipeId) -> Result<Option<RecipeSummary>, RecipeRepositoryError> {
        Ok(self.store.read().await.get(id).map(StoredRecipe::summary))
    }

    async fn update(
        &self,
        id: &RecipeId,
        content: &RecipeContent,
        now: DateTime<Utc>,
    ) -> Result<RecipeSummary, RecipeRepositoryError> {
        let mut store = self.store.write().await;
        let stored = store.get_mut(id).ok_or_else(|| not_found(id))?;
        stored.recipe.revise(content.clone(), now);
        Ok(stored.summary())
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, RecipeRepositoryError> {
        Ok(self.store.write().await.remove(id).is_some())
    }

    async fn list(&self, query: &RecipeListQuery) -> Result<RecipePage, RecipeRepositoryError> {
        let all = self
            .store
            .read()
            .await
            .values()
            .map(StoredRecipe::summary)
            .collect();
        Ok(RecipePage::from_summaries(all, query))
    }

    async fn toggle_vote(
        &self,
        id: &RecipeId,
        user: &UserId,
        polarity: VotePolarity,
    ) -> Result<VoteTally, RecipeRepositoryError> {
        let mut store = self.store.write().await;
        let stored = store.get_mut(id).ok_or_else(|| not_found(id))?;
        match stored.vote_of(user).toggle(polarity).polarity() {
            Some(cast) => {
                stored.votes.insert(*user, cast);
            }
            None => {
                stored.votes.remove(user);
            }
        }
        Ok(stored.tally())
    }

    async fn vote_state(
        &self,
        id: &RecipeId,
        user: &UserId,
    ) -> Result<VoteState, RecipeRepositoryError> {
        let store = self.store.read().await;
        let stored = store.get(id).ok_or_else(|| not_found(id))?;
        Ok(stored.vote_of(user))
    }
}
