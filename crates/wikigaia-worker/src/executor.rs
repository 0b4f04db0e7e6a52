//! Task executor: fans each task out to the handlers that accept it.

use std::sync::Arc;

use async_trait::async_trait;

use wikigaia_core::error::AppError;
use wikigaia_core::types::TaskId;

use crate::queue::{Task, TaskKind};

/// A unit of background work reacting to tasks.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Handler name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this handler reacts to `kind`.
    fn handles(&self, kind: &TaskKind) -> bool;

    /// Process the task.
    async fn handle(&self, task: &Task) -> Result<(), TaskExecutionError>;
}

/// Error from task execution. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum TaskExecutionError {
    /// The handler was given a task it does not process.
    #[error("Unsupported task: {0}")]
    Unsupported(&'static str),

    /// The work ran but did not fully succeed.
    #[error("Task failed: {0}")]
    Failed(String),

    /// A store or service call failed.
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Outcome of executing one task.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// The task.
    pub task_id: Option<TaskId>,
    /// Handlers that succeeded.
    pub succeeded: Vec<&'static str>,
    /// Handlers that failed, with their error.
    pub failed: Vec<(&'static str, TaskExecutionError)>,
}

impl ExecutionReport {
    /// Whether any handler ran.
    pub fn was_handled(&self) -> bool {
        !self.succeeded.is_empty() || !self.failed.is_empty()
    }
}

/// Runs every registered handler accepting a task, in registration order.
///
/// A failing handler is logged and does not stop the others.
#[derive(Default)]
pub struct TaskExecutor {
    handlers: Vec<Arc<dyn TaskHandler>>,
}

impl std::fmt::Debug for TaskExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskExecutor")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

impl TaskExecutor {
    /// Create an executor with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler.
    pub fn register(&mut self, handler: Arc<dyn TaskHandler>) {
        tracing::info!(handler = handler.name(), "Registered task handler");
        self.handlers.push(handler);
    }

    /// Builder-style [`TaskExecutor::register`].
    pub fn with_handler(mut self, handler: Arc<dyn TaskHandler>) -> Self {
        self.register(handler);
        self
    }

    /// Names of registered handlers, in order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Execute a task against every handler that accepts it.
    pub async fn execute(&self, task: &Task) -> ExecutionReport {
        let mut report = ExecutionReport {
            task_id: Some(task.id),
            ..ExecutionReport::default()
        };

        for handler in self.handlers.iter().filter(|h| h.handles(&task.kind)) {
            match handler.handle(task).await {
                Ok(()) => report.succeeded.push(handler.name()),
                Err(e) => {
                    tracing::error!(
                        task_id = %task.id,
                        task = task.kind.name(),
                        handler = handler.name(),
                        error = %e,
                        "Task handler failed"
                    );
                    report.failed.push((handler.name(), e));
                }
            }
        }

        if !report.was_handled() {
            tracing::warn!(task_id = %task.id, task = task.kind.name(), "No handler accepted task");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        name: &'static str,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TaskHandler for Counting {
        fn name(&self) -> &'static str {
            self.name
        }

        fn handles(&self, kind: &TaskKind) -> bool {
            matches!(kind, TaskKind::VoteCountAudit)
        }

        async fn handle(&self, _task: &Task) -> Result<(), TaskExecutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TaskExecutionError::Failed("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn counting(name: &'static str, fail: bool) -> Arc<Counting> {
        Arc::new(Counting {
            name,
            fail,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_other_handlers() {
        let first = counting("first", true);
        let second = counting("second", false);
        let executor = TaskExecutor::new()
            .with_handler(first.clone())
            .with_handler(second.clone());

        let report = executor.execute(&Task::new(TaskKind::VoteCountAudit)).await;
        assert_eq!(report.succeeded, vec!["second"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "first");
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unaccepted_task_is_unhandled() {
        let handler = counting("audit", false);
        let executor = TaskExecutor::new().with_handler(handler.clone());
        let report = executor
            .execute(&Task::new(TaskKind::NotificationCleanup))
            .await;
        assert!(!report.was_handled());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }
}
