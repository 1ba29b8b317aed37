//! Translation of pool and Diesel failures into recipe repository errors.
//!
//! Messages stay generic; the driver's own text is only logged at debug
//! level so it never reaches a response body.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::RecipeRepositoryError;

use super::pool::PoolError;

/// Postgres reports deadlocks as an unclassified error.
const DEADLOCK_MARKER: &str = "deadlock detected";

pub(crate) fn map_pool_error(error: PoolError) -> RecipeRepositoryError {
    RecipeRepositoryError::connection(error.into_message())
}

pub(crate) fn map_diesel_error(error: DieselError) -> RecipeRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            RecipeRepositoryError::conflict("serialization failure")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            RecipeRepositoryError::conflict("concurrent insert")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RecipeRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, info) if info.message().contains(DEADLOCK_MARKER) => {
            RecipeRepositoryError::conflict("deadlock detected")
        }
        DieselError::NotFound => RecipeRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RecipeRepositoryError::query("database query error"),
        _ => RecipeRepositoryError::query("database error"),
    }
}
