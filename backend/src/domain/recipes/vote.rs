//! Vote toggling.
//!
//! A user holds at most one vote per recipe. Casting the same polarity twice
//! withdraws the vote; casting the opposite polarity switches it.
//!
//! | current \ cast | Up   | Down |
//! |----------------|------|------|
//! | None           | Up   | Down |
//! | Up             | None | Down |
//! | Down           | Up   | None |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Direction of a cast vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VotePolarity {
    /// An upvote.
    Up,
    /// A downvote.
    Down,
}

impl VotePolarity {
    /// Stable lowercase name, also used as the stored polarity value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VotePolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored polarity value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vote polarity: {0}")]
pub struct UnknownPolarity(pub String);

impl FromStr for VotePolarity {
    type Err = UnknownPolarity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(UnknownPolarity(other.to_owned())),
        }
    }
}

/// A user's vote on one recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoteState {
    /// No vote cast.
    #[default]
    None,
    /// Upvoted.
    Up,
    /// Downvoted.
    Down,
}

impl VoteState {
    /// Apply a cast vote and return the resulting state.
    ///
    /// # Examples
    /// ```
    /// use recipes::domain::{VotePolarity, VoteState};
    ///
    /// let state = VoteState::None.toggle(VotePolarity::Up);
    /// assert_eq!(state, VoteState::Up);
    /// assert_eq!(state.toggle(VotePolarity::Up), VoteState::None);
    /// assert_eq!(state.toggle(VotePolarity::Down), VoteState::Down);
    /// ```
    #[must_use]
    pub const fn toggle(self, cast: VotePolarity) -> Self {
        match (self, cast) {
            (Self::Up, VotePolarity::Up) | (Self::Down, VotePolarity::Down) => Self::None,
            (_, VotePolarity::Up) => Self::Up,
            (_, VotePolarity::Down) => Self::Down,
        }
    }

    /// Polarity of the vote, if one is cast.
    pub const fn polarity(self) -> Option<VotePolarity> {
        match self {
            Self::None => None,
            Self::Up => Some(VotePolarity::Up),
            Self::Down => Some(VotePolarity::Down),
        }
    }
}

impl From<Option<VotePolarity>> for VoteState {
    fn from(value: Option<VotePolarity>) -> Self {
        match value {
            None => Self::None,
            Some(VotePolarity::Up) => Self::Up,
            Some(VotePolarity::Down) => Self::Down,
        }
    }
}

/// Vote counts for one recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct VoteTally {
    /// Number of upvotes.
    pub upvotes: u64,
    /// Number of downvotes.
    pub downvotes: u64,
}

impl VoteTally {
    /// Build a tally from counts.
    pub const fn new(upvotes: u64, downvotes: u64) -> Self {
        Self { upvotes, downvotes }
    }

    /// Count the votes held in `states`.
    pub fn count<I>(states: I) -> Self
    where
        I: IntoIterator<Item = VoteState>,
    {
        states
            .into_iter()
            .fold(Self::default(), |mut tally, state| {
                tally.add(state);
                tally
            })
    }

    /// Adjust the counts for a single user moving from `before` to `after`.
    pub fn apply(&mut self, before: VoteState, after: VoteState) {
        self.remove(before);
        self.add(after);
    }

    fn add(&mut self, state: VoteState) {
        match state {
            VoteState::Up => self.upvotes = self.upvotes.saturating_add(1),
            VoteState::Down => self.downvotes = self.downvotes.saturating_add(1),
            VoteState::None => {}
        }
    }

    fn remove(&mut self, state: VoteState) {
        match state {
            VoteState::Up => self.upvotes = self.upvotes.saturating_sub(1),
            VoteState::Down => self.downvotes = self.downvotes.saturating_sub(1),
            VoteState::None => {}
        }
    }
}
