//! Realtime fan-out of vote changes.

use std::sync::Arc;

use async_trait::async_trait;

use wikigaia_realtime::VoteBroadcaster;

use crate::executor::{TaskExecutionError, TaskHandler};
use crate::queue::{Task, TaskKind};

/// Pushes the new count to every stream subscribed to the problem.
#[derive(Debug, Clone)]
pub struct BroadcastTaskHandler {
    broadcaster: Arc<VoteBroadcaster>,
}

impl BroadcastTaskHandler {
    /// Create a new broadcast task handler.
    pub fn new(broadcaster: Arc<VoteBroadcaster>) -> Self {
        Self { broadcaster }
    }
}

#[async_trait]
impl TaskHandler for BroadcastTaskHandler {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    fn handles(&self, kind: &TaskKind) -> bool {
        matches!(kind, TaskKind::VoteChanged { .. })
    }

    async fn handle(&self, task: &Task) -> Result<(), TaskExecutionError> {
        let TaskKind::VoteChanged {
            problem_id,
            user_id,
            action,
            new_count,
            ..
        } = task.kind
        else {
            return Err(TaskExecutionError::Unsupported(task.kind.name()));
        };

        self.broadcaster
            .broadcast(problem_id, new_count, action.has_voted(), Some(user_id));
        Ok(())
    }
}
