//! Internal Diesel row structs.
//!
//! Rows never leave the persistence layer; the repository converts them to
//! domain types and re-validates stored content on the way out.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Timestamptz, Uuid as SqlUuid, Varchar};
use uuid::Uuid;

use crate::domain::{
    Recipe, RecipeContent, RecipeId, RecipeInput, RecipeSummary, UserId, VoteTally,
};

use super::schema::{recipe_votes, recipes};

/// Full `recipes` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipeRow {
    /// Rebuild the domain recipe.
    ///
    /// Returns the validation message when stored content no longer passes
    /// the domain rules.
    pub fn into_recipe(self) -> Result<Recipe, String> {
        let id = self.id;
        let content = RecipeContent::try_from_input(RecipeInput {
            title: self.title,
            description: self.description,
            ingredients: self.ingredients,
            instructions: self.instructions,
            image: self.image,
        })
        .map_err(|err| format!("stored recipe {id} is invalid: {err}"))?;
        Ok(Recipe::new(
            RecipeId::from_uuid(id),
            UserId::from_uuid(self.author_id),
            content,
            self.created_at,
            self.updated_at,
        ))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipes)]
pub(crate) struct NewRecipeRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub ingredients: &'a str,
    pub instructions: &'a str,
    pub image: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Recipe> for NewRecipeRow<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        let content = recipe.content();
        Self {
            id: *recipe.id().as_uuid(),
            author_id: *recipe.author().as_uuid(),
            title: content.title(),
            description: content.description(),
            ingredients: content.ingredients(),
            instructions: content.instructions(),
            image: content.image(),
            created_at: recipe.created_at(),
            updated_at: recipe.updated_at(),
        }
    }
}

/// Editable columns; `author_id` and `created_at` are never updated.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = recipes)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RecipeChangeset<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub ingredients: &'a str,
    pub instructions: &'a str,
    pub image: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Recipe> for RecipeChangeset<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        let content = recipe.content();
        Self {
            title: content.title(),
            description: content.description(),
            ingredients: content.ingredients(),
            instructions: content.instructions(),
            image: content.image(),
            updated_at: recipe.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipe_votes)]
pub(crate) struct NewVoteRow<'a> {
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub polarity: &'a str,
}

/// A recipe joined with its derived vote counts, read through raw SQL.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct RecipeListingRow {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = SqlUuid)]
    pub author_id: Uuid,
    #[diesel(sql_type = Varchar)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub description: String,
    #[diesel(sql_type = Text)]
    pub ingredients: String,
    #[diesel(sql_type = Text)]
    pub instructions: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub image: Option<String>,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    pub updated_at: DateTime<Utc>,
    #[diesel(sql_type = BigInt)]
    pub upvotes: i64,
    #[diesel(sql_type = BigInt)]
    pub downvotes: i64,
}

impl RecipeListingRow {
    pub fn into_summary(self) -> Result<RecipeSummary, String> {
        let tally = VoteTally::new(non_negative(self.upvotes), non_negative(self.downvotes));
        let recipe = RecipeRow {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            description: self.description,
            ingredients: self.ingredients,
            instructions: self.instructions,
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_recipe()?;
        Ok(RecipeSummary::new(recipe, tally))
    }
}

/// `COUNT(*)` result.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
}

pub(crate) fn non_negative(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
