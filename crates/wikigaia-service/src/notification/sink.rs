//! External delivery channel for recorded notifications.

use async_trait::async_trait;

use wikigaia_core::result::AppResult;
use wikigaia_entity::notification::Notification;

/// Delivers a recorded notification to its recipient.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    /// Deliver one notification. An error leaves it unsent.
    async fn deliver(&self, notification: &Notification) -> AppResult<()>;
}

/// Sink that only logs; transport is handled outside this service.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        tracing::info!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            kind = %notification.kind,
            "Notification delivered"
        );
        Ok(())
    }
}
