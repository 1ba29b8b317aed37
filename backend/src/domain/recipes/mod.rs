//! Recipes: authored content, votes and list queries.
//!
//! A [`Recipe`] is written by exactly one author and carries validated
//! [`RecipeContent`]. Vote counts are never stored on the recipe itself; read
//! models pair a recipe with a [`VoteTally`] in a [`RecipeSummary`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::{Error, UserId};

pub mod access;
pub mod query;
pub mod service;
pub mod vote;

#[cfg(test)]
mod service_tests;
#[cfg(test)]
mod tests;

pub use self::access::{AccessDenied, RecipeAction, authorize};
pub use self::query::{
    RECIPES_PAGE_SIZE, RecipeListQuery, RecipePage, RecipeQueryError, RecipeSort, SearchTerm,
    compare_for_sort, matches_search,
};
pub use self::vote::{VotePolarity, VoteState, VoteTally};

/// Maximum title length, counted in characters after trimming.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum length of the description, ingredients and instructions.
pub const TEXT_MAX_CHARS: usize = 10_000;
/// Maximum length of an image reference.
pub const IMAGE_MAX_CHARS: usize = 2_048;

/// Opaque recipe identifier.
///
/// # Examples
/// ```
/// use recipes::domain::RecipeId;
///
/// let id: RecipeId = "6f1b2c0e-4a53-4a4e-9d8e-0d3a8c0b1f2a".parse().expect("uuid");
/// assert_eq!(id.to_string(), "6f1b2c0e-4a53-4a4e-9d8e-0d3a8c0b1f2a");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(Uuid);

impl RecipeId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecipeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Editable recipe fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecipeField {
    /// Recipe title.
    Title,
    /// Short description.
    Description,
    /// Ingredient list.
    Ingredients,
    /// Preparation steps.
    Instructions,
    /// Optional image reference.
    Image,
}

impl RecipeField {
    /// Wire name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Ingredients => "ingredients",
            Self::Instructions => "instructions",
            Self::Image => "image",
        }
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    /// The field was missing or blank.
    Required,
    /// The field exceeded its maximum length.
    TooLong {
        /// Maximum permitted characters.
        max: usize,
    },
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("this field is required"),
            Self::TooLong { max } => write!(f, "must be at most {max} characters"),
        }
    }
}

/// Every problem found while validating recipe input.
///
/// Problems are keyed by field so clients can re-present the form with one
/// message per failing field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipeValidationError {
    problems: BTreeMap<RecipeField, FieldProblem>,
}

impl RecipeValidationError {
    /// Problems keyed by field.
    pub fn problems(&self) -> &BTreeMap<RecipeField, FieldProblem> {
        &self.problems
    }

    /// Problem recorded for `field`, if any.
    pub fn problem(&self, field: RecipeField) -> Option<FieldProblem> {
        self.problems.get(&field).copied()
    }

    fn record(&mut self, field: RecipeField, problem: FieldProblem) {
        self.problems.insert(field, problem);
    }

    fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.problems.keys().map(|field| field.as_str()).collect();
        write!(f, "invalid recipe fields: {}", fields.join(", "))
    }
}

impl std::error::Error for RecipeValidationError {}

impl From<RecipeValidationError> for Error {
    fn from(value: RecipeValidationError) -> Self {
        let field_errors: Map<String, Value> = value
            .problems
            .iter()
            .map(|(field, problem)| (field.as_str().to_owned(), Value::String(problem.to_string())))
            .collect();
        Error::invalid_request("recipe failed validation")
            .with_details(json!({ "fieldErrors": field_errors }))
    }
}

/// Raw, unvalidated recipe fields as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeInput {
    /// Proposed title.
    pub title: String,
    /// Proposed description.
    pub description: String,
    /// Proposed ingredient list.
    pub ingredients: String,
    /// Proposed instructions.
    pub instructions: String,
    /// Proposed image reference.
    pub image: Option<String>,
}

/// Validated recipe content.
///
/// ## Invariants
/// - `title` is trimmed and holds 1..=[`TITLE_MAX_CHARS`] characters.
/// - `description`, `ingredients` and `instructions` are non-blank and at
///   most [`TEXT_MAX_CHARS`] characters.
/// - `image`, when present, is trimmed, non-blank and at most
///   [`IMAGE_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeContent {
    title: String,
    description: String,
    ingredients: String,
    instructions: String,
    image: Option<String>,
}

fn check_text(
    errors: &mut RecipeValidationError,
    field: RecipeField,
    value: &str,
    max: usize,
) {
    if value.trim().is_empty() {
        errors.record(field, FieldProblem::Required);
    } else if value.chars().count() > max {
        errors.record(field, FieldProblem::TooLong { max });
    }
}

impl RecipeContent {
    /// Validate raw input, collecting every failing field.
    ///
    /// # Examples
    /// ```
    /// use recipes::domain::{RecipeContent, RecipeField, RecipeInput};
    ///
    /// let err = RecipeContent::try_from_input(RecipeInput::default()).expect_err("blank");
    /// assert!(err.problem(RecipeField::Title).is_some());
    /// assert!(err.problem(RecipeField::Image).is_none());
    /// ```
    pub fn try_from_input(input: RecipeInput) -> Result<Self, RecipeValidationError> {
        let RecipeInput {
            title,
            description,
            ingredients,
            instructions,
            image,
        } = input;

        let mut errors = RecipeValidationError::default();
        let title = title.trim().to_owned();
        check_text(&mut errors, RecipeField::Title, &title, TITLE_MAX_CHARS);
        check_text(&mut errors, RecipeField::Description, &description, TEXT_MAX_CHARS);
        check_text(&mut errors, RecipeField::Ingredients, &ingredients, TEXT_MAX_CHARS);
        check_text(&mut errors, RecipeField::Instructions, &instructions, TEXT_MAX_CHARS);

        let image = image
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        if image
            .as_deref()
            .is_some_and(|reference| reference.chars().count() > IMAGE_MAX_CHARS)
        {
            errors.record(
                RecipeField::Image,
                FieldProblem::TooLong {
                    max: IMAGE_MAX_CHARS,
                },
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            title,
            description,
            ingredients,
            instructions,
            image,
        })
    }

    /// Recipe title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Short description shown in listings.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Ingredient list.
    pub fn ingredients(&self) -> &str {
        self.ingredients.as_str()
    }

    /// Preparation steps.
    pub fn instructions(&self) -> &str {
        self.instructions.as_str()
    }

    /// Image reference, if one was supplied.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

/// A stored recipe.
///
/// ## Invariants
/// - `author` never changes after creation.
/// - `created_at <= updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    id: RecipeId,
    author: UserId,
    content: RecipeContent,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Assemble a recipe from stored parts.
    ///
    /// `updated_at` is raised to `created_at` if it would precede it.
    pub fn new(
        id: RecipeId,
        author: UserId,
        content: RecipeContent,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author,
            content,
            created_at,
            updated_at: updated_at.max(created_at),
        }
    }

    /// Replace the content, stamping the update time.
    pub fn revise(&mut self, content: RecipeContent, now: DateTime<Utc>) {
        self.content = content;
        self.updated_at = now.max(self.created_at);
    }

    /// Recipe identifier.
    pub fn id(&self) -> RecipeId {
        self.id
    }

    /// The user who created the recipe.
    pub fn author(&self) -> &UserId {
        &self.author
    }

    /// Whether `user` wrote this recipe.
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.author == user
    }

    /// Validated content.
    pub fn content(&self) -> &RecipeContent {
        &self.content
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last edit timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// A recipe paired with its current vote counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    /// The recipe.
    pub recipe: Recipe,
    /// Derived vote counts.
    pub tally: VoteTally,
}

impl RecipeSummary {
    /// Pair a recipe with its tally.
    pub fn new(recipe: Recipe, tally: VoteTally) -> Self {
        Self { recipe, tally }
    }
}

/// Detail view of a recipe for a particular caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetail {
    /// Recipe with counts.
    pub summary: RecipeSummary,
    /// The caller's current vote; [`VoteState::None`] for anonymous callers.
    pub my_vote: VoteState,
    /// Whether the caller wrote the recipe.
    pub is_author: bool,
}
