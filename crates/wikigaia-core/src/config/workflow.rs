//! Lifecycle advance rules.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Statuses a workflow rule may target, in lifecycle order.
pub const WORKFLOW_STATUSES: &[&str] = &[
    "proposed",
    "under_review",
    "priority_queue",
    "in_development",
    "completed",
];

/// One advance rule: once `vote_count >= min_votes`, the problem should be
/// at least at `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRule {
    /// Vote count at which the rule applies.
    pub min_votes: i64,
    /// Target lifecycle status (snake_case).
    pub status: String,
}

impl WorkflowRule {
    /// Return the validated target status name.
    pub fn target_status(&self) -> Result<&str, AppError> {
        if WORKFLOW_STATUSES.contains(&self.status.as_str()) {
            Ok(self.status.as_str())
        } else {
            Err(AppError::configuration(format!(
                "Unknown workflow status '{}'",
                self.status
            )))
        }
    }
}

/// Workflow status updater configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Whether vote changes may advance the lifecycle status.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Advance rules.
    #[serde(default = "default_rules")]
    pub rules: Vec<WorkflowRule>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: default_rules(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rules() -> Vec<WorkflowRule> {
    vec![
        WorkflowRule {
            min_votes: 50,
            status: "under_review".to_string(),
        },
        WorkflowRule {
            min_votes: 100,
            status: "priority_queue".to_string(),
        },
    ]
}
