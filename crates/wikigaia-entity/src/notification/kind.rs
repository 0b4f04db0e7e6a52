//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Sent to the proposer when their problem crosses a threshold.
    MilestoneReached,
    /// Sent to every admin when a problem crosses the top threshold.
    AdminMilestoneAlert,
}

impl NotificationKind {
    /// Return the kind as stored in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MilestoneReached => "milestone_reached",
            Self::AdminMilestoneAlert => "admin_milestone_alert",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
