//! Problem entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wikigaia_core::types::{CategoryId, ProblemId, UserId};

use super::moderation::ModerationStatus;
use super::status::ProblemStatus;

/// A proposed problem that the community votes on.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Problem {
    /// Unique problem identifier.
    pub id: ProblemId,
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Category, if assigned.
    pub category_id: Option<CategoryId>,
    /// The user who proposed the problem.
    pub proposer_id: UserId,
    /// Lifecycle stage.
    pub status: ProblemStatus,
    /// Denormalized vote count, maintained by the store.
    pub vote_count: i64,
    /// Moderation state.
    pub moderation_status: ModerationStatus,
    /// Whether the problem is featured on the landing page.
    pub is_featured: bool,
    /// Soft-deactivation flag.
    pub is_active: bool,
    /// When the problem was created.
    pub created_at: DateTime<Utc>,
    /// When the problem was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Problem {
    /// Check whether the given user proposed this problem.
    pub fn is_proposed_by(&self, user_id: UserId) -> bool {
        self.proposer_id == user_id
    }
}

/// Data required to create a new problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProblem {
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Optional category.
    pub category_id: Option<CategoryId>,
    /// The proposing user.
    pub proposer_id: UserId,
}
