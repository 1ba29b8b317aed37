//! PostgreSQL-backed `RecipeRepository` using Diesel.
//!
//! Vote toggles lock the recipe row (`SELECT ... FOR UPDATE`) before reading
//! the caller's vote, so toggles on one recipe run one at a time. Counts are
//! recomputed from `recipe_votes` inside the same transaction. Listing reads
//! use raw SQL for the aggregate join and run in one read-only snapshot so
//! the total and the page agree.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text, Uuid as SqlUuid};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    Recipe, RecipeContent, RecipeId, RecipeListQuery, RecipePage, RecipeSort, RecipeSummary,
    SearchTerm, UserId, VotePolarity, VoteState, VoteTally,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    CountRow, NewRecipeRow, NewVoteRow, RecipeChangeset, RecipeListingRow, RecipeRow,
    non_negative,
};
use super::pool::DbPool;
use super::schema::{recipe_votes, recipes};

const LISTING_SELECT: &str = r#"
SELECT r.id, r.author_id, r.title, r.description, r.ingredients, r.instructions, r.image,
       r.created_at, r.updated_at,
       COALESCE(v.upvotes, 0) AS upvotes,
       COALESCE(v.downvotes, 0) AS downvotes
FROM recipes r
LEFT JOIN (
    SELECT recipe_id,
           COUNT(*) FILTER (WHERE polarity = 'up') AS upvotes,
           COUNT(*) FILTER (WHERE polarity = 'down') AS downvotes
    FROM recipe_votes
    GROUP BY recipe_id
) v ON v.recipe_id = r.id
"#;

const SEARCH_FILTER: &str =
    "($1::text IS NULL OR r.title ILIKE $1 OR r.description ILIKE $1)";

const COUNT_SQL: &str = r#"
SELECT COUNT(*) AS total
FROM recipes r
WHERE ($1::text IS NULL OR r.title ILIKE $1 OR r.description ILIKE $1)
"#;

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, thiserror::Error)]
enum StoreError {
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),
    #[error(transparent)]
    Repository(#[from] RecipeRepositoryError),
}

impl From<StoreError> for RecipeRepositoryError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Diesel(err) => map_diesel_error(err),
            StoreError::Repository(err) => err,
        }
    }
}

fn missing(recipe_id: Uuid) -> StoreError {
    StoreError::Repository(RecipeRepositoryError::not_found(recipe_id.to_string()))
}

fn corrupt(message: String) -> StoreError {
    StoreError::Repository(RecipeRepositoryError::query(message))
}

/// Build an `ILIKE` pattern matching `term` anywhere, with wildcards in the
/// term itself escaped.
fn like_pattern(term: &SearchTerm) -> String {
    let raw = term.as_str();
    let mut pattern = String::with_capacity(raw.len() + 2);
    pattern.push('%');
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// `ORDER BY` clause for `sort`. Ties fall back to the id so pages are stable.
fn order_by(sort: RecipeSort) -> &'static str {
    match sort {
        RecipeSort::Newest => "r.created_at DESC, r.id ASC",
        RecipeSort::Oldest => "r.created_at ASC, r.id ASC",
        RecipeSort::MostUpvotes => "upvotes DESC, r.id ASC",
        RecipeSort::MostDownvotes => "downvotes DESC, r.id ASC",
    }
}

fn page_sql(sort: RecipeSort) -> String {
    format!(
        "{LISTING_SELECT} WHERE {SEARCH_FILTER} ORDER BY {} LIMIT $2 OFFSET $3",
        order_by(sort)
    )
}

fn to_sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn parse_polarity(raw: &str) -> Result<VotePolarity, StoreError> {
    VotePolarity::from_str(raw).map_err(|err| corrupt(format!("stored vote is invalid: {err}")))
}

async fn lock_recipe(conn: &mut AsyncPgConnection, recipe_id: Uuid) -> Result<RecipeRow, StoreError> {
    recipes::table
        .find(recipe_id)
        .select(RecipeRow::as_select())
        .for_update()
        .get_result(conn)
        .await
        .optional()?
        .ok_or_else(|| missing(recipe_id))
}

async fn current_vote(
    conn: &mut AsyncPgConnection,
    recipe_id: Uuid,
    user_id: Uuid,
) -> Result<VoteState, StoreError> {
    let stored: Option<String> = recipe_votes::table
        .find((recipe_id, user_id))
        .select(recipe_votes::polarity)
        .get_result(conn)
        .await
        .optional()?;
    let polarity = stored.as_deref().map(parse_polarity).transpose()?;
    Ok(VoteState::from(polarity))
}

async fn tally_for(conn: &mut AsyncPgConnection, recipe_id: Uuid) -> Result<VoteTally, StoreError> {
    let polarities: Vec<String> = recipe_votes::table
        .filter(recipe_votes::recipe_id.eq(recipe_id))
        .select(recipe_votes::polarity)
        .load(conn)
        .await?;
    let states = polarities
        .iter()
        .map(|raw| parse_polarity(raw).map(|polarity| VoteState::from(Some(polarity))))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(VoteTally::count(states))
}

/// Move the stored vote from `before` to `after`.
async fn write_vote(
    conn: &mut AsyncPgConnection,
    recipe_id: Uuid,
    user_id: Uuid,
    before: VoteState,
    after: VoteState,
) -> Result<(), StoreError> {
    let key = recipe_votes::table.find((recipe_id, user_id));
    match (before.polarity(), after.polarity()) {
        (None, None) => {}
        (Some(_), None) => {
            diesel::delete(key).execute(conn).await?;
        }
        (None, Some(cast)) => {
            diesel::insert_into(recipe_votes::table)
                .values(NewVoteRow {
                    recipe_id,
                    user_id,
                    polarity: cast.as_str(),
                })
                .execute(conn)
                .await?;
        }
        (Some(_), Some(cast)) => {
            diesel::update(key)
                .set(recipe_votes::polarity.eq(cast.as_str()))
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn create(
        &self,
        author: &UserId,
        content: &RecipeContent,
        now: DateTime<Utc>,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let recipe = Recipe::new(RecipeId::random(), *author, content.clone(), now, now);
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        diesel::insert_into(recipes::table)
            .values(NewRecipeRow::from(&recipe))
            .execute(conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(recipe)
    }

    async fn find(&self, id: &RecipeId) -> Result<Option<RecipeSummary>, RecipeRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let row: Option<RecipeListingRow> = sql_query(format!("{LISTING_SELECT} WHERE r.id = $1"))
            .bind::<SqlUuid, _>(*id.as_uuid())
            .get_result(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row.into_summary().map_err(RecipeRepositoryError::query))
            .transpose()
    }

    async fn update(
        &self,
        id: &RecipeId,
        content: &RecipeContent,
        now: DateTime<Utc>,
    ) -> Result<RecipeSummary, RecipeRepositoryError> {
        let recipe_id = *id.as_uuid();
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let summary = conn
            .transaction::<_, StoreError, _>(|conn| {
                async move {
                    let mut recipe = lock_recipe(conn, recipe_id)
                        .await?
                        .into_recipe()
                        .map_err(corrupt)?;
                    recipe.revise(content.clone(), now);
                    diesel::update(recipes::table.find(recipe_id))
                        .set(RecipeChangeset::from(&recipe))
                        .execute(conn)
                        .await?;
                    let tally = tally_for(conn, recipe_id).await?;
                    Ok(RecipeSummary::new(recipe, tally))
                }
                .scope_boxed()
            })
            .await?;
        Ok(summary)
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let removed = diesel::delete(recipes::table.find(*id.as_uuid()))
            .execute(conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list(&self, query: &RecipeListQuery) -> Result<RecipePage, RecipeRepositoryError> {
        let pattern = query.search().map(like_pattern);
        let sort = query.sort();
        let request = query.page();
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let (rows, window) = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let count: CountRow = sql_query(COUNT_SQL)
                        .bind::<Nullable<Text>, _>(pattern.clone())
                        .get_result(conn)
                        .await?;
                    let window = request.window(non_negative(count.total));
                    let rows: Vec<RecipeListingRow> = sql_query(page_sql(sort))
                        .bind::<Nullable<Text>, _>(pattern)
                        .bind::<BigInt, _>(to_sql_count(window.limit()))
                        .bind::<BigInt, _>(to_sql_count(window.offset()))
                        .load(conn)
                        .await?;
                    Ok((rows, window))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(|row| row.into_summary().map_err(RecipeRepositoryError::query))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RecipePage::new(items, window, query))
    }

    async fn toggle_vote(
        &self,
        id: &RecipeId,
        user: &UserId,
        polarity: VotePolarity,
    ) -> Result<VoteTally, RecipeRepositoryError> {
        let recipe_id = *id.as_uuid();
        let user_id = *user.as_uuid();
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let tally = conn
            .transaction::<_, StoreError, _>(|conn| {
                async move {
                    lock_recipe(conn, recipe_id).await?;
                    let before = current_vote(conn, recipe_id, user_id).await?;
                    let after = before.toggle(polarity);
                    write_vote(conn, recipe_id, user_id, before, after).await?;
                    debug!(%recipe_id, ?before, ?after, "vote row written");
                    tally_for(conn, recipe_id).await
                }
                .scope_boxed()
            })
            .await?;
        Ok(tally)
    }

    async fn vote_state(
        &self,
        id: &RecipeId,
        user: &UserId,
    ) -> Result<VoteState, RecipeRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        Ok(current_vote(conn, *id.as_uuid(), *user.as_uuid()).await?)
    }
}
