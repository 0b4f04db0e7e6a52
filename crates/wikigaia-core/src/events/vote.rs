//! Vote-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::{ProblemId, UserId};

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    /// A community vote was inserted.
    Added,
    /// A community vote was deleted.
    Removed,
}

impl VoteAction {
    /// Whether the acting user holds a community vote afterwards.
    pub fn has_voted(&self) -> bool {
        matches!(self, Self::Added)
    }

    /// The vote count before the mutation, given the count read back after it.
    pub fn previous_count(&self, new_count: i64) -> i64 {
        match self {
            Self::Added => (new_count - 1).max(0),
            Self::Removed => new_count + 1,
        }
    }
}

impl std::fmt::Display for VoteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// Events related to voting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VoteEvent {
    /// A community vote was toggled and the store count was read back.
    Changed {
        /// The problem voted on.
        problem_id: ProblemId,
        /// The acting user.
        user_id: UserId,
        /// Whether the vote was added or removed.
        action: VoteAction,
        /// Count before the mutation.
        old_count: i64,
        /// Count after the mutation (as maintained by the store).
        new_count: i64,
    },
}
