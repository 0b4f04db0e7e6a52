//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wikigaia_core::types::{NotificationId, ProblemId, UserId};

use super::kind::NotificationKind;

/// A notification addressed to one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient.
    pub recipient_id: UserId,
    /// Notification kind (see [`NotificationKind`]).
    pub kind: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Structured data (JSON).
    pub payload: serde_json::Value,
    /// The problem this notification concerns.
    pub problem_id: Option<ProblemId>,
    /// When the notification was recorded.
    pub created_at: DateTime<Utc>,
    /// When the notification was handed to the delivery channel.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the recipient read it.
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Check if the notification has been read.
    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }

    /// Check if the notification was delivered.
    pub fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }
}

/// Data required to record a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// The recipient.
    pub recipient_id: UserId,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Structured data (JSON).
    pub payload: serde_json::Value,
    /// The problem this notification concerns.
    pub problem_id: Option<ProblemId>,
}
