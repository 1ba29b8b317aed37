//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed recipe entities and the rules applied to
//! them, independent of HTTP and storage. Inbound adapters talk to the
//! driving ports in [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Recipe, RecipeContent, RecipeSummary, RecipeDetail: the recipe model.
//! - VoteState / VotePolarity / VoteTally: vote toggling.
//! - RecipeListQuery / RecipePage: the list pipeline.
//! - RecipeService: implementation of the driving ports.

pub mod auth;
pub mod error;
pub mod ports;
pub mod recipes;
pub mod trace_id;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::recipes::service::{DEFAULT_VOTE_RETRY_ATTEMPTS, RecipeService};
pub use self::recipes::vote::UnknownPolarity;
pub use self::recipes::{
    AccessDenied, FieldProblem, IMAGE_MAX_CHARS, RECIPES_PAGE_SIZE, Recipe, RecipeAction,
    RecipeContent, RecipeDetail, RecipeField, RecipeId, RecipeInput, RecipeListQuery, RecipePage,
    RecipeQueryError, RecipeSort, RecipeSummary, RecipeValidationError, SearchTerm,
    TEXT_MAX_CHARS, TITLE_MAX_CHARS, VotePolarity, VoteState, VoteTally, authorize,
    compare_for_sort, matches_search,
};
pub use self::trace_id::TraceId;
pub use self::user::{UserId, UserValidationError};
