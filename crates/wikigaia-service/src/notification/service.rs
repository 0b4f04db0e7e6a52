//! Notification inbox.

use std::sync::Arc;

use wikigaia_core::error::AppError;
use wikigaia_core::result::AppResult;
use wikigaia_core::types::{NotificationId, PageRequest, PageResponse};
use wikigaia_database::store::NotificationStore;
use wikigaia_entity::notification::Notification;

use crate::context::RequestContext;

/// Lists and acknowledges the caller's notifications.
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationStore>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notifications: Arc<dyn NotificationStore>) -> Self {
        Self { notifications }
    }

    /// Lists notifications for the current user, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.notifications
            .find_by_recipient(ctx.user_id, &page.normalized())
            .await
    }

    /// Marks one of the caller's notifications as read.
    pub async fn mark_read(&self, ctx: &RequestContext, id: NotificationId) -> AppResult<()> {
        if self.notifications.mark_read(id, ctx.user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Notification {id} not found")))
        }
    }
}
