//! Workflow status advancement on vote changes.

use async_trait::async_trait;

use wikigaia_service::{WorkflowOutcome, WorkflowStatusUpdater};

use crate::executor::{TaskExecutionError, TaskHandler};
use crate::queue::{Task, TaskKind};

/// Applies the workflow rules to the new count.
#[derive(Clone)]
pub struct WorkflowTaskHandler {
    updater: WorkflowStatusUpdater,
}

impl WorkflowTaskHandler {
    /// Create a new workflow task handler.
    pub fn new(updater: WorkflowStatusUpdater) -> Self {
        Self { updater }
    }
}

#[async_trait]
impl TaskHandler for WorkflowTaskHandler {
    fn name(&self) -> &'static str {
        "workflow"
    }

    fn handles(&self, kind: &TaskKind) -> bool {
        matches!(kind, TaskKind::VoteChanged { .. })
    }

    async fn handle(&self, task: &Task) -> Result<(), TaskExecutionError> {
        let TaskKind::VoteChanged {
            problem_id,
            new_count,
            ..
        } = task.kind
        else {
            return Err(TaskExecutionError::Unsupported(task.kind.name()));
        };

        match self.updater.apply(problem_id, new_count).await? {
            WorkflowOutcome::NotFound => Err(TaskExecutionError::Failed(format!(
                "Problem {problem_id} not found"
            ))),
            _ => Ok(()),
        }
    }
}
