//! Cron scheduler for periodic maintenance tasks.

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use wikigaia_core::config::WorkerConfig;
use wikigaia_core::error::AppError;

use crate::queue::{TaskKind, TaskQueue};

/// Enqueues maintenance tasks on cron schedules.
pub struct CronScheduler {
    scheduler: JobScheduler,
    queue: TaskQueue,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler feeding `queue`.
    pub async fn new(queue: TaskQueue) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;
        Ok(Self { scheduler, queue })
    }

    /// Register the notification cleanup and vote-count audit schedules.
    pub async fn register_default_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register(
            &config.notification_cleanup_cron,
            TaskKind::NotificationCleanup,
        )
        .await?;
        self.register(&config.vote_count_audit_cron, TaskKind::VoteCountAudit)
            .await?;
        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Enqueue `kind` every time `schedule` fires.
    pub async fn register(&self, schedule: &str, kind: TaskKind) -> Result<(), AppError> {
        let name = kind.name();
        let queue = self.queue.clone();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let queue = queue.clone();
            let kind = kind.clone();
            Box::pin(async move {
                tracing::debug!(task = kind.name(), "Scheduling maintenance task");
                if let Err(e) = queue.enqueue(kind) {
                    tracing::error!(error = %e, "Failed to enqueue scheduled task");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{schedule}' for {name}: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!(task = name, schedule, "Registered scheduled task");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;
        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;
        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
