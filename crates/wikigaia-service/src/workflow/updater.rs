//! Advances a problem's lifecycle status when vote thresholds are crossed.

use std::sync::Arc;

use tracing::{info, warn};

use wikigaia_core::config::WorkflowConfig;
use wikigaia_core::result::AppResult;
use wikigaia_core::types::ProblemId;
use wikigaia_database::store::ProblemStore;
use wikigaia_entity::problem::ProblemStatus;

/// What an update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The status moved forward.
    Advanced {
        /// Previous status.
        from: ProblemStatus,
        /// New status.
        to: ProblemStatus,
    },
    /// Already at or past the target, no rule applies, or another writer
    /// changed the status first.
    Unchanged,
    /// The problem does not exist.
    NotFound,
    /// Workflow updates are switched off.
    Disabled,
}

/// Applies the configured advance rules. Never regresses a status.
#[derive(Clone)]
pub struct WorkflowStatusUpdater {
    problems: Arc<dyn ProblemStore>,
    /// `(min_votes, status)`, ascending by `min_votes`.
    rules: Vec<(i64, ProblemStatus)>,
    enabled: bool,
}

impl WorkflowStatusUpdater {
    /// Creates an updater; rules naming unknown statuses are skipped.
    pub fn new(problems: Arc<dyn ProblemStore>, config: &WorkflowConfig) -> Self {
        let mut rules: Vec<(i64, ProblemStatus)> = config
            .rules
            .iter()
            .filter_map(|rule| match rule.status.parse::<ProblemStatus>() {
                Ok(status) => Some((rule.min_votes, status)),
                Err(e) => {
                    warn!(status = %rule.status, error = %e, "Ignoring workflow rule");
                    None
                }
            })
            .collect();
        rules.sort_by_key(|(min_votes, _)| *min_votes);
        Self {
            problems,
            rules,
            enabled: config.enabled,
        }
    }

    /// The status `current` should advance to at `vote_count`, if any.
    pub fn target_for(&self, current: ProblemStatus, vote_count: i64) -> Option<ProblemStatus> {
        self.rules
            .iter()
            .filter(|(min_votes, _)| vote_count >= *min_votes)
            .map(|(_, status)| *status)
            .max_by_key(ProblemStatus::rank)
            .filter(|target| current.can_advance_to(*target))
    }

    /// Advance `problem_id` if its count warrants it.
    pub async fn apply(&self, problem_id: ProblemId, vote_count: i64) -> AppResult<WorkflowOutcome> {
        if !self.enabled {
            return Ok(WorkflowOutcome::Disabled);
        }
        let Some(problem) = self.problems.find_by_id(problem_id).await? else {
            return Ok(WorkflowOutcome::NotFound);
        };
        let Some(target) = self.target_for(problem.status, vote_count) else {
            return Ok(WorkflowOutcome::Unchanged);
        };

        if self
            .problems
            .advance_status(problem_id, problem.status, target)
            .await?
        {
            info!(
                %problem_id,
                from = %problem.status,
                to = %target,
                vote_count,
                "Problem status advanced"
            );
            Ok(WorkflowOutcome::Advanced {
                from: problem.status,
                to: target,
            })
        } else {
            Ok(WorkflowOutcome::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikigaia_core::config::WorkflowRule;
    use wikigaia_core::types::UserId;
    use wikigaia_database::Stores;
    use wikigaia_entity::problem::CreateProblem;
    use wikigaia_entity::user::UserRole;

    async fn problem(stores: &Stores) -> ProblemId {
        let proposer = UserId::new();
        stores
            .users
            .upsert(proposer, None, UserRole::User)
            .await
            .expect("user");
        stores
            .problems
            .create_with_creator_vote(&CreateProblem {
                title: "Bike lanes".to_string(),
                description: "Map missing bike lanes".to_string(),
                category_id: None,
                proposer_id: proposer,
            })
            .await
            .expect("problem")
            .id
    }

    #[test]
    fn test_target_for_never_regresses() {
        let updater = WorkflowStatusUpdater::new(
            Stores::in_memory().problems,
            &WorkflowConfig::default(),
        );
        assert_eq!(updater.target_for(ProblemStatus::Proposed, 49), None);
        assert_eq!(
            updater.target_for(ProblemStatus::Proposed, 50),
            Some(ProblemStatus::UnderReview)
        );
        assert_eq!(
            updater.target_for(ProblemStatus::Proposed, 120),
            Some(ProblemStatus::PriorityQueue)
        );
        assert_eq!(updater.target_for(ProblemStatus::PriorityQueue, 60), None);
        assert_eq!(updater.target_for(ProblemStatus::InDevelopment, 120), None);
        assert_eq!(updater.target_for(ProblemStatus::Rejected, 120), None);
    }

    #[test]
    fn test_unknown_rule_status_is_skipped() {
        let config = WorkflowConfig {
            enabled: true,
            rules: vec![WorkflowRule {
                min_votes: 1,
                status: "launched".to_string(),
            }],
        };
        let updater = WorkflowStatusUpdater::new(Stores::in_memory().problems, &config);
        assert_eq!(updater.target_for(ProblemStatus::Proposed, 10), None);
    }

    #[tokio::test]
    async fn test_apply_advances_once() {
        let stores = Stores::in_memory();
        let id = problem(&stores).await;
        let updater = WorkflowStatusUpdater::new(stores.problems.clone(), &WorkflowConfig::default());

        assert_eq!(
            updater.apply(id, 100).await.expect("apply"),
            WorkflowOutcome::Advanced {
                from: ProblemStatus::Proposed,
                to: ProblemStatus::PriorityQueue
            }
        );
        assert_eq!(
            updater.apply(id, 55).await.expect("apply"),
            WorkflowOutcome::Unchanged
        );
        assert_eq!(
            updater.apply(ProblemId::new(), 55).await.expect("apply"),
            WorkflowOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_disabled_updater_does_nothing() {
        let stores = Stores::in_memory();
        let id = problem(&stores).await;
        let config = WorkflowConfig {
            enabled: false,
            ..WorkflowConfig::default()
        };
        let updater = WorkflowStatusUpdater::new(stores.problems.clone(), &config);
        assert_eq!(updater.apply(id, 100).await.expect("apply"), WorkflowOutcome::Disabled);
    }
}
