//! Problem lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of a problem.
///
/// The non-terminal stages form a ladder; `Rejected` sits outside it and is
/// never advanced out of by vote activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "problem_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
    /// Newly proposed, collecting votes.
    Proposed,
    /// Picked up for review.
    UnderReview,
    /// Queued for development.
    PriorityQueue,
    /// Being built.
    InDevelopment,
    /// Shipped.
    Completed,
    /// Declined.
    Rejected,
}

impl ProblemStatus {
    /// Position on the lifecycle ladder.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Proposed => 0,
            Self::UnderReview => 1,
            Self::PriorityQueue => 2,
            Self::InDevelopment => 3,
            Self::Completed => 4,
            Self::Rejected => u8::MAX,
        }
    }

    /// Whether vote activity may no longer move the problem.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Whether moving from `self` to `target` is a forward step.
    pub fn can_advance_to(&self, target: ProblemStatus) -> bool {
        !self.is_terminal() && !target.is_terminal() && target.rank() > self.rank()
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::UnderReview => "under_review",
            Self::PriorityQueue => "priority_queue",
            Self::InDevelopment => "in_development",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProblemStatus {
    type Err = wikigaia_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proposed" => Ok(Self::Proposed),
            "under_review" => Ok(Self::UnderReview),
            "priority_queue" => Ok(Self::PriorityQueue),
            "in_development" => Ok(Self::InDevelopment),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(wikigaia_core::AppError::validation(format!(
                "Invalid problem status: '{s}'"
            ))),
        }
    }
}
