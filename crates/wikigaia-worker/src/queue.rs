//! Bounded in-process task queue.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use async_trait::async_trait;
use wikigaia_core::error::AppError;
use wikigaia_core::events::{DomainEvent, EventPayload, VoteAction, VoteEvent};
use wikigaia_core::result::AppResult;
use wikigaia_core::traits::EventPublisher;
use wikigaia_core::types::{ProblemId, TaskId, UserId};

/// Work items processed by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// A community vote was toggled.
    VoteChanged {
        /// The problem.
        problem_id: ProblemId,
        /// The acting user.
        user_id: UserId,
        /// Added or removed.
        action: VoteAction,
        /// Count before the toggle.
        old_count: i64,
        /// Count after the toggle.
        new_count: i64,
    },
    /// Delete notifications past the retention window.
    NotificationCleanup,
    /// Compare stored vote counts with vote rows.
    VoteCountAudit,
}

impl TaskKind {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VoteChanged { .. } => "vote_changed",
            Self::NotificationCleanup => "notification_cleanup",
            Self::VoteCountAudit => "vote_count_audit",
        }
    }
}

impl From<VoteEvent> for TaskKind {
    fn from(event: VoteEvent) -> Self {
        match event {
            VoteEvent::Changed {
                problem_id,
                user_id,
                action,
                old_count,
                new_count,
            } => Self::VoteChanged {
                problem_id,
                user_id,
                action,
                old_count,
                new_count,
            },
        }
    }
}

/// A queued task.
#[derive(Debug, Clone)]
pub struct Task {
    /// Task ID.
    pub id: TaskId,
    /// What to do.
    pub kind: TaskKind,
    /// When the task was queued.
    pub enqueued_at: DateTime<Utc>,
}

impl Task {
    /// Create a task stamped now.
    pub fn new(kind: TaskKind) -> Self {
        Self {
            id: TaskId::new(),
            kind,
            enqueued_at: Utc::now(),
        }
    }
}

/// Sending half of the task queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    sender: mpsc::Sender<Task>,
}

impl TaskQueue {
    /// Create a queue holding at most `capacity` pending tasks. The receiver
    /// goes to the [`WorkerRunner`](crate::runner::WorkerRunner).
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Task>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queue a task without waiting.
    ///
    /// Fails with a service-unavailable error when the queue is full or the
    /// worker has stopped; the task is dropped.
    pub fn enqueue(&self, kind: TaskKind) -> AppResult<TaskId> {
        let task = Task::new(kind);
        let id = task.id;
        let name = task.kind.name();
        match self.sender.try_send(task) {
            Ok(()) => {
                tracing::debug!(task_id = %id, task = name, "Task enqueued");
                Ok(id)
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(task = name, "Task queue full, dropping task");
                Err(AppError::service_unavailable("Task queue is full"))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(task = name, "Task queue closed, dropping task");
                Err(AppError::service_unavailable("Task queue is closed"))
            }
        }
    }

    /// Tasks waiting to be picked up.
    pub fn pending(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }
}

#[async_trait]
impl EventPublisher for TaskQueue {
    async fn publish(&self, event: DomainEvent) -> AppResult<()> {
        match event.payload {
            EventPayload::Vote(vote) => self.enqueue(vote.into()).map(|_| ()),
        }
    }
}
