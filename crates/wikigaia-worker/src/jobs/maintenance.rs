//! Notification cleanup and vote-count audit.

use async_trait::async_trait;

use wikigaia_core::config::WorkerConfig;
use wikigaia_service::MaintenanceService;

use crate::executor::{TaskExecutionError, TaskHandler};
use crate::queue::{Task, TaskKind};

/// Handles the scheduled maintenance tasks.
#[derive(Clone)]
pub struct MaintenanceTaskHandler {
    service: MaintenanceService,
    retention_days: u32,
    unsent_grace_minutes: u32,
}

impl MaintenanceTaskHandler {
    /// Create a new maintenance task handler.
    pub fn new(service: MaintenanceService, config: &WorkerConfig) -> Self {
        Self {
            service,
            retention_days: config.notification_retention_days,
            unsent_grace_minutes: config.unsent_milestone_grace_minutes,
        }
    }
}

#[async_trait]
impl TaskHandler for MaintenanceTaskHandler {
    fn name(&self) -> &'static str {
        "maintenance"
    }

    fn handles(&self, kind: &TaskKind) -> bool {
        matches!(
            kind,
            TaskKind::NotificationCleanup | TaskKind::VoteCountAudit
        )
    }

    async fn handle(&self, task: &Task) -> Result<(), TaskExecutionError> {
        match task.kind {
            TaskKind::NotificationCleanup => {
                self.service
                    .cleanup_notifications(self.retention_days)
                    .await?;
            }
            TaskKind::VoteCountAudit => {
                // Findings are logged by the service; drift is never repaired.
                self.service
                    .audit_vote_counts(self.unsent_grace_minutes)
                    .await?;
            }
            TaskKind::VoteChanged { .. } => {
                return Err(TaskExecutionError::Unsupported(task.kind.name()));
            }
        }
        Ok(())
    }
}
