//! Vote type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a vote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vote_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    /// A regular vote cast by a community member.
    Community,
    /// The proposer's own seed vote, created with the problem.
    CreatorInterest,
}

impl VoteType {
    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Community => "community",
            Self::CreatorInterest => "creator_interest",
        }
    }

    /// Whether the self-vote prohibition applies to this type.
    pub fn forbids_self_vote(&self) -> bool {
        matches!(self, Self::Community)
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
