//! Worker runner: drains the task queue with bounded concurrency.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, watch};

use crate::executor::TaskExecutor;
use crate::queue::Task;

/// Pulls tasks off the queue and executes them.
#[derive(Debug)]
pub struct WorkerRunner {
    receiver: mpsc::Receiver<Task>,
    executor: Arc<TaskExecutor>,
    concurrency: usize,
    drain_timeout: Duration,
}

impl WorkerRunner {
    /// Create a runner executing at most `concurrency` tasks at once.
    pub fn new(
        receiver: mpsc::Receiver<Task>,
        executor: Arc<TaskExecutor>,
        concurrency: usize,
    ) -> Self {
        Self {
            receiver,
            executor,
            concurrency: concurrency.max(1),
            drain_timeout: Duration::from_secs(30),
        }
    }

    /// How long shutdown waits for in-flight tasks.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Run until `shutdown` flips to `true` or every queue sender is gone.
    ///
    /// On shutdown the queue is closed, already-queued tasks are still
    /// executed, and in-flight tasks get up to the drain timeout to finish.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            concurrency = self.concurrency,
            handlers = ?self.executor.handler_names(),
            "Worker started"
        );
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Worker received shutdown signal");
                        break;
                    }
                }
                task = self.receiver.recv() => match task {
                    Some(task) => self.spawn(task, &semaphore).await,
                    None => {
                        tracing::info!("Task queue closed");
                        break;
                    }
                },
            }
        }

        self.receiver.close();
        while let Some(task) = self.receiver.recv().await {
            self.spawn(task, &semaphore).await;
        }

        tracing::info!("Worker waiting for in-flight tasks");
        let permits = u32::try_from(self.concurrency).unwrap_or(u32::MAX);
        if tokio::time::timeout(self.drain_timeout, semaphore.acquire_many(permits))
            .await
            .is_err()
        {
            tracing::warn!("Worker drain timed out with tasks still running");
        }
        tracing::info!("Worker shut down");
    }

    async fn spawn(&self, task: Task, semaphore: &Arc<Semaphore>) {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::error!(task_id = %task.id, "Worker semaphore closed, dropping task");
                return;
            }
        };
        let executor = Arc::clone(&self.executor);
        tokio::spawn(async move {
            let _permit = permit;
            let started = std::time::Instant::now();
            let report = executor.execute(&task).await;
            tracing::debug!(
                task_id = %task.id,
                task = task.kind.name(),
                succeeded = report.succeeded.len(),
                failed = report.failed.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Task finished"
            );
        });
    }
}
