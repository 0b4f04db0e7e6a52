//! Milestone record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wikigaia_core::types::{MilestoneId, ProblemId};

/// Marks that a problem's vote count reached a threshold.
///
/// At most one row exists per `(problem_id, threshold)`. The row is claimed
/// before notifications go out and flagged once they have been sent. An
/// unsent row whose claim is older than the lease can be claimed again.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MilestoneRecord {
    /// Row identifier.
    pub id: MilestoneId,
    /// The problem.
    pub problem_id: ProblemId,
    /// The threshold reached.
    pub threshold: i64,
    /// When the threshold was first reached.
    pub achieved_at: DateTime<Utc>,
    /// When the current sender took the claim.
    pub claimed_at: DateTime<Utc>,
    /// Whether the milestone notifications were sent.
    pub notification_sent: bool,
    /// When the notifications were sent.
    pub notified_at: Option<DateTime<Utc>>,
}
