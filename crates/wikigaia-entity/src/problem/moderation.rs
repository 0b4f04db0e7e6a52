//! Problem moderation status.

use serde::{Deserialize, Serialize};

/// Moderation state of a proposed problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "moderation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    /// Awaiting moderation.
    #[default]
    Pending,
    /// Approved by a moderator.
    Approved,
    /// Rejected by a moderator.
    Rejected,
}
