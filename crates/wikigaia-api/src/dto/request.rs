//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use wikigaia_core::types::{CategoryId, ProblemId, UserId};

/// Propose a problem.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProblemRequest {
    /// Short title.
    #[validate(length(min = 5, max = 200, message = "Title must be 5 to 200 characters"))]
    pub title: String,
    /// Full description.
    #[validate(length(
        min = 10,
        max = 5000,
        message = "Description must be 10 to 5000 characters"
    ))]
    pub description: String,
    /// Optional category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// Run milestone detection for a count change.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VoteMilestoneRequest {
    /// The problem.
    pub problem_id: ProblemId,
    /// Count after the change.
    #[validate(range(min = 0))]
    pub new_vote_count: i64,
    /// Count before the change.
    #[validate(range(min = 0))]
    pub old_vote_count: i64,
}

/// Push a vote delta to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastVoteRequest {
    /// The problem.
    pub problem_id: ProblemId,
    /// Count after the change.
    #[validate(range(min = 0))]
    pub new_vote_count: i64,
    /// Whether the acting user holds a vote afterwards.
    pub has_voted: bool,
    /// The acting user.
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Query string of the vote stream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStreamQuery {
    /// Comma-separated problem ids.
    #[serde(default)]
    pub problem_ids: String,
}
