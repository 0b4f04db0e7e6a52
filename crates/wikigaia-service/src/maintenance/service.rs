//! Notification retention and vote-count auditing.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use wikigaia_core::result::AppResult;
use wikigaia_database::store::{MilestoneStore, NotificationStore, ProblemStore, VoteCountDrift};
use wikigaia_entity::milestone::MilestoneRecord;

/// Findings of one vote-count audit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    /// Problems whose stored count disagrees with their vote rows.
    pub drift: Vec<VoteCountDrift>,
    /// Milestones claimed but still unsent after the grace period.
    pub unsent_milestones: Vec<MilestoneRecord>,
}

impl AuditReport {
    /// Whether the audit found nothing.
    pub fn is_clean(&self) -> bool {
        self.drift.is_empty() && self.unsent_milestones.is_empty()
    }
}

/// Housekeeping run by the cron scheduler.
#[derive(Clone)]
pub struct MaintenanceService {
    problems: Arc<dyn ProblemStore>,
    milestones: Arc<dyn MilestoneStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl MaintenanceService {
    /// Creates a new maintenance service.
    pub fn new(
        problems: Arc<dyn ProblemStore>,
        milestones: Arc<dyn MilestoneStore>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            problems,
            milestones,
            notifications,
        }
    }

    /// Delete notifications older than `retention_days`.
    pub async fn cleanup_notifications(&self, retention_days: u32) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
        let deleted = self.notifications.delete_older_than(cutoff).await?;
        info!(deleted, retention_days, "Old notifications cleaned up");
        Ok(deleted)
    }

    /// Report count drift and stuck milestones. Nothing is repaired; the
    /// store trigger owns `vote_count`.
    pub async fn audit_vote_counts(&self, unsent_grace_minutes: u32) -> AppResult<AuditReport> {
        let drift = self.problems.find_vote_count_drift().await?;
        for d in &drift {
            warn!(
                problem_id = %d.problem_id,
                stored = d.stored_count,
                actual = d.actual_count,
                "Vote count drift"
            );
        }

        let cutoff = Utc::now() - Duration::minutes(i64::from(unsent_grace_minutes));
        let unsent_milestones = self.milestones.find_unsent(cutoff).await?;
        for m in &unsent_milestones {
            warn!(
                problem_id = %m.problem_id,
                threshold = m.threshold,
                claimed_at = %m.claimed_at,
                "Milestone claimed but never notified"
            );
        }

        let report = AuditReport {
            drift,
            unsent_milestones,
        };
        if report.is_clean() {
            info!("Vote count audit clean");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikigaia_core::types::UserId;
    use wikigaia_database::{MemoryStore, Stores};
    use wikigaia_entity::problem::CreateProblem;
    use wikigaia_entity::user::UserRole;

    #[tokio::test]
    async fn test_audit_reports_drift_and_unsent() {
        let memory = MemoryStore::shared();
        let stores = Stores::memory(memory.clone());
        let proposer = UserId::new();
        stores
            .users
            .upsert(proposer, None, UserRole::User)
            .await
            .expect("user");
        let problem = stores
            .problems
            .create_with_creator_vote(&CreateProblem {
                title: "Tree census".to_string(),
                description: "Count street trees".to_string(),
                category_id: None,
                proposer_id: proposer,
            })
            .await
            .expect("problem");
        let service = MaintenanceService::new(
            stores.problems.clone(),
            stores.milestones.clone(),
            stores.notifications.clone(),
        );

        assert!(service.audit_vote_counts(10).await.expect("audit").is_clean());

        memory.corrupt_vote_count(problem.id, 3).await.expect("corrupt");
        stores
            .milestones
            .claim(problem.id, 50, Utc::now())
            .await
            .expect("claim");

        let report = service.audit_vote_counts(10).await.expect("audit");
        assert_eq!(report.drift.len(), 1);
        assert_eq!(report.drift[0].stored_count, 3);
        assert_eq!(report.drift[0].actual_count, 1);
        assert!(report.unsent_milestones.is_empty());
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_recent_notifications() {
        let stores = Stores::in_memory();
        let service = MaintenanceService::new(
            stores.problems.clone(),
            stores.milestones.clone(),
            stores.notifications.clone(),
        );
        assert_eq!(service.cleanup_notifications(90).await.expect("cleanup"), 0);
    }
}
