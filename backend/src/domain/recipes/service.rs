//! Recipe domain service implementing the driving ports.
//!
//! The service owns the rules that sit between handlers and storage: who may
//! change what, content validation, timestamps and the retry policy for
//! votes that lose a race with a concurrent voter.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::{
    RecipeAction, RecipeContent, RecipeDetail, RecipeId, RecipeListQuery, RecipePage,
    RecipeSummary, VoteState, VoteTally, authorize,
};
use crate::domain::ports::{
    CastVoteRequest, CreateRecipeRequest, DeleteRecipeRequest, RecipeCommand, RecipeQuery,
    RecipeRepository, RecipeRepositoryError, UpdateRecipeRequest,
};
use crate::domain::{Error, UserId};

/// Attempts made for a vote before reporting the store as busy.
pub const DEFAULT_VOTE_RETRY_ATTEMPTS: u32 = 3;

const VOTE_BUSY_MESSAGE: &str = "vote could not be recorded; please retry";

/// Recipe service implementing [`RecipeCommand`] and [`RecipeQuery`].
#[derive(Clone)]
pub struct RecipeService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    vote_retry_attempts: u32,
}

impl<R> RecipeService<R> {
    /// Create a service over `repo` using `clock` for timestamps.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use recipes::domain::RecipeService;
    /// use recipes::outbound::memory::InMemoryRecipeRepository;
    ///
    /// let service = RecipeService::new(
    ///     Arc::new(InMemoryRecipeRepository::default()),
    ///     Arc::new(DefaultClock),
    /// )
    /// .with_vote_retry_attempts(5);
    /// ```
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            vote_retry_attempts: DEFAULT_VOTE_RETRY_ATTEMPTS,
        }
    }

    /// Override how many times a conflicting vote is attempted.
    ///
    /// Values below one are raised to one.
    #[must_use]
    pub fn with_vote_retry_attempts(mut self, attempts: u32) -> Self {
        self.vote_retry_attempts = attempts.max(1);
        self
    }
}

fn map_repository_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipeRepositoryError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
        RecipeRepositoryError::NotFound { .. } => Error::not_found("recipe not found"),
        RecipeRepositoryError::Conflict { message } => {
            Error::conflict(format!("recipe was modified concurrently: {message}"))
        }
    }
}

impl<R> RecipeService<R>
where
    R: RecipeRepository,
{
    async fn load(&self, recipe_id: &RecipeId) -> Result<RecipeSummary, Error> {
        self.repo
            .find(recipe_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("recipe not found"))
    }

    async fn vote_of(&self, recipe_id: &RecipeId, viewer: Option<&UserId>) -> Result<VoteState, Error> {
        match viewer {
            Some(user) => self
                .repo
                .vote_state(recipe_id, user)
                .await
                .map_err(map_repository_error),
            None => Ok(VoteState::None),
        }
    }
}

#[async_trait]
impl<R> RecipeCommand for RecipeService<R>
where
    R: RecipeRepository,
{
    async fn create(&self, request: CreateRecipeRequest) -> Result<RecipeDetail, Error> {
        let author = authorize(RecipeAction::Create, request.user.as_ref())?;
        let content = RecipeContent::try_from_input(request.input)?;
        let recipe = self
            .repo
            .create(&author, &content, self.clock.utc())
            .await
            .map_err(map_repository_error)?;

        info!(recipe_id = %recipe.id(), author = %author, "recipe created");
        Ok(RecipeDetail {
            summary: RecipeSummary::new(recipe, VoteTally::default()),
            my_vote: VoteState::None,
            is_author: true,
        })
    }

    async fn update(&self, request: UpdateRecipeRequest) -> Result<RecipeDetail, Error> {
        let current = self.load(&request.recipe_id).await?;
        let editor = authorize(RecipeAction::Update(&current.recipe), request.user.as_ref())?;
        let content = RecipeContent::try_from_input(request.input)?;
        let summary = self
            .repo
            .update(&request.recipe_id, &content, self.clock.utc())
            .await
            .map_err(map_repository_error)?;
        let my_vote = self.vote_of(&request.recipe_id, Some(&editor)).await?;

        info!(recipe_id = %request.recipe_id, "recipe updated");
        Ok(RecipeDetail {
            summary,
            my_vote,
            is_author: true,
        })
    }

    async fn delete(&self, request: DeleteRecipeRequest) -> Result<(), Error> {
        let current = self.load(&request.recipe_id).await?;
        authorize(RecipeAction::Delete(&current.recipe), request.user.as_ref())?;
        let deleted = self
            .repo
            .delete(&request.recipe_id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(Error::not_found("recipe not found"));
        }

        info!(recipe_id = %request.recipe_id, "recipe deleted");
        Ok(())
    }

    async fn cast_vote(&self, request: CastVoteRequest) -> Result<VoteTally, Error> {
        let Some(voter) = request.user else {
            return Err(Error::unauthorized("login required"));
        };

        for attempt in 1..=self.vote_retry_attempts {
            match self
                .repo
                .toggle_vote(&request.recipe_id, &voter, request.polarity)
                .await
            {
                Ok(tally) => {
                    info!(
                        recipe_id = %request.recipe_id,
                        polarity = %request.polarity,
                        upvotes = tally.upvotes,
                        downvotes = tally.downvotes,
                        "vote toggled"
                    );
                    return Ok(tally);
                }
                Err(RecipeRepositoryError::Conflict { message }) => {
                    warn!(
                        recipe_id = %request.recipe_id,
                        attempt,
                        max_attempts = self.vote_retry_attempts,
                        %message,
                        "vote lost a concurrent update; retrying"
                    );
                }
                Err(other) => return Err(map_repository_error(other)),
            }
        }

        Err(Error::service_unavailable(VOTE_BUSY_MESSAGE))
    }
}

#[async_trait]
impl<R> RecipeQuery for RecipeService<R>
where
    R: RecipeRepository,
{
    async fn list(&self, query: RecipeListQuery) -> Result<RecipePage, Error> {
        self.repo.list(&query).await.map_err(map_repository_error)
    }

    async fn detail(
        &self,
        recipe_id: RecipeId,
        viewer: Option<UserId>,
    ) -> Result<RecipeDetail, Error> {
        let summary = self.load(&recipe_id).await?;
        let my_vote = self.vote_of(&recipe_id, viewer.as_ref()).await?;
        let is_author = viewer
            .as_ref()
            .is_some_and(|user| summary.recipe.is_authored_by(user));
        Ok(RecipeDetail {
            summary,
            my_vote,
            is_author,
        })
    }
}
