//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background task worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of concurrently executing tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Capacity of the in-process task queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Cron expression for notification cleanup.
    #[serde(default = "default_cleanup_cron")]
    pub notification_cleanup_cron: String,
    /// Cron expression for the vote-count audit.
    #[serde(default = "default_audit_cron")]
    pub vote_count_audit_cron: String,
    /// Notifications older than this are deleted by the cleanup job.
    #[serde(default = "default_retention_days")]
    pub notification_retention_days: u32,
    /// Milestones claimed but unsent for longer than this are reported and
    /// may be claimed again by the next dispatch.
    #[serde(default = "default_unsent_grace")]
    pub unsent_milestone_grace_minutes: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: default_concurrency(),
            queue_capacity: default_queue_capacity(),
            notification_cleanup_cron: default_cleanup_cron(),
            vote_count_audit_cron: default_audit_cron(),
            notification_retention_days: default_retention_days(),
            unsent_milestone_grace_minutes: default_unsent_grace(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_cleanup_cron() -> String {
    "0 0 3 * * *".to_string()
}

fn default_audit_cron() -> String {
    "0 0 * * * *".to_string()
}

fn default_retention_days() -> u32 {
    90
}

fn default_unsent_grace() -> u32 {
    10
}
