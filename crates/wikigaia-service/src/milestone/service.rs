//! Detect-then-dispatch orchestration for vote count changes.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use wikigaia_core::result::AppResult;
use wikigaia_core::types::ProblemId;
use wikigaia_database::store::MilestoneStore;
use wikigaia_entity::milestone::MilestoneRecord;

use super::detector::MilestoneDetector;
use crate::notification::{NotificationDispatcher, NotificationResult};

/// What happened for one count change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneReport {
    /// Thresholds crossed by the change, ascending.
    pub milestones_triggered: Vec<i64>,
    /// Per-threshold, per-recipient dispatch results.
    pub results: Vec<NotificationResult>,
}

/// Runs the detector and hands crossings to the dispatcher.
#[derive(Clone)]
pub struct MilestoneService {
    detector: MilestoneDetector,
    dispatcher: Arc<NotificationDispatcher>,
    milestones: Arc<dyn MilestoneStore>,
}

impl MilestoneService {
    /// Creates a new milestone service.
    pub fn new(
        detector: MilestoneDetector,
        dispatcher: Arc<NotificationDispatcher>,
        milestones: Arc<dyn MilestoneStore>,
    ) -> Self {
        Self {
            detector,
            dispatcher,
            milestones,
        }
    }

    /// Process a count change from `old_count` to `new_count`.
    ///
    /// Besides the thresholds the change crosses, every threshold at or
    /// below `new_count` without a notified record is dispatched again. Two
    /// overlapping toggles can both read back the later count, so neither
    /// event crosses the threshold in between.
    pub async fn process(
        &self,
        problem_id: ProblemId,
        old_count: i64,
        new_count: i64,
    ) -> MilestoneReport {
        let mut crossed = self.detector.detect(old_count, new_count);
        crossed.extend(self.unnotified_reached(problem_id, new_count).await);
        if crossed.is_empty() {
            return MilestoneReport {
                milestones_triggered: Vec::new(),
                results: Vec::new(),
            };
        }

        info!(
            %problem_id,
            old_count,
            new_count,
            thresholds = ?crossed,
            "Vote milestones crossed"
        );
        let results = self.dispatcher.dispatch(problem_id, &crossed).await;

        MilestoneReport {
            milestones_triggered: crossed.into_iter().collect(),
            results,
        }
    }

    /// Reached thresholds whose record is missing or still unsent.
    async fn unnotified_reached(&self, problem_id: ProblemId, count: i64) -> BTreeSet<i64> {
        let reached: Vec<i64> = self
            .detector
            .thresholds()
            .iter()
            .copied()
            .filter(|t| *t <= count)
            .collect();
        if reached.is_empty() {
            return BTreeSet::new();
        }

        match self.milestones.find_by_problem(problem_id).await {
            Ok(records) => reached
                .into_iter()
                .filter(|t| {
                    !records
                        .iter()
                        .any(|r| r.threshold == *t && r.notification_sent)
                })
                .collect(),
            Err(err) => {
                warn!(%problem_id, error = %err, "Failed to load milestone records");
                BTreeSet::new()
            }
        }
    }

    /// Milestone records reached by a problem.
    pub async fn list(&self, problem_id: ProblemId) -> AppResult<Vec<MilestoneRecord>> {
        self.milestones.find_by_problem(problem_id).await
    }
}
