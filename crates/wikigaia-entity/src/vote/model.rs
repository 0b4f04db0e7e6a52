//! Vote entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wikigaia_core::types::{ProblemId, UserId, VoteId};

use super::kind::VoteType;

/// A persisted (user, problem, vote_type) tuple.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vote {
    /// Row identifier.
    pub id: VoteId,
    /// The voting user.
    pub user_id: UserId,
    /// The problem voted on.
    pub problem_id: ProblemId,
    /// Community vote or creator interest.
    pub vote_type: VoteType,
    /// When the vote was cast.
    pub created_at: DateTime<Utc>,
}
