//! Milestone detection and notification dispatch on vote changes.

use async_trait::async_trait;

use wikigaia_service::{MilestoneService, NotificationOutcome};

use crate::executor::{TaskExecutionError, TaskHandler};
use crate::queue::{Task, TaskKind};

/// Runs [`MilestoneService::process`] for every vote change.
#[derive(Clone)]
pub struct MilestoneTaskHandler {
    service: MilestoneService,
}

impl MilestoneTaskHandler {
    /// Create a new milestone task handler.
    pub fn new(service: MilestoneService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TaskHandler for MilestoneTaskHandler {
    fn name(&self) -> &'static str {
        "milestone"
    }

    fn handles(&self, kind: &TaskKind) -> bool {
        matches!(kind, TaskKind::VoteChanged { .. })
    }

    async fn handle(&self, task: &Task) -> Result<(), TaskExecutionError> {
        let TaskKind::VoteChanged {
            problem_id,
            old_count,
            new_count,
            ..
        } = task.kind
        else {
            return Err(TaskExecutionError::Unsupported(task.kind.name()));
        };

        let report = self.service.process(problem_id, old_count, new_count).await;
        let failed = report
            .results
            .iter()
            .filter(|r| r.outcome == NotificationOutcome::Failed)
            .count();
        if failed > 0 {
            return Err(TaskExecutionError::Failed(format!(
                "{failed} milestone notification(s) failed for problem {problem_id}"
            )));
        }
        Ok(())
    }
}
