//! Who may change a recipe.
//!
//! Anyone signed in may create recipes and vote. Only the author may edit or
//! delete their recipe. Reads are public and never pass through here.

use super::Recipe;
use crate::domain::{Error, UserId};

/// A guarded recipe mutation.
#[derive(Debug, Clone, Copy)]
pub enum RecipeAction<'a> {
    /// Create a new recipe.
    Create,
    /// Edit an existing recipe.
    Update(&'a Recipe),
    /// Remove an existing recipe.
    Delete(&'a Recipe),
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    /// No user is signed in.
    #[error("login required")]
    Unauthenticated,
    /// The caller is signed in but did not write the recipe.
    #[error("only the author may change this recipe")]
    NotAuthor,
}

impl From<AccessDenied> for Error {
    fn from(value: AccessDenied) -> Self {
        match value {
            AccessDenied::Unauthenticated => Error::unauthorized(value.to_string()),
            AccessDenied::NotAuthor => Error::forbidden(value.to_string()),
        }
    }
}

/// Check whether `user` may perform `action`, returning the acting user.
///
/// Callers load the target recipe first, so a missing recipe surfaces as
/// not found before this check runs.
///
/// # Examples
/// ```
/// use recipes::domain::{AccessDenied, RecipeAction, UserId, authorize};
///
/// assert_eq!(
///     authorize(RecipeAction::Create, None),
///     Err(AccessDenied::Unauthenticated)
/// );
/// let user = UserId::random();
/// assert_eq!(authorize(RecipeAction::Create, Some(&user)), Ok(user));
/// ```
pub fn authorize(action: RecipeAction<'_>, user: Option<&UserId>) -> Result<UserId, AccessDenied> {
    let user = user.ok_or(AccessDenied::Unauthenticated)?;
    match action {
        RecipeAction::Create => Ok(*user),
        RecipeAction::Update(recipe) | RecipeAction::Delete(recipe) => {
            if recipe.is_authored_by(user) {
                Ok(*user)
            } else {
                Err(AccessDenied::NotAuthor)
            }
        }
    }
}
