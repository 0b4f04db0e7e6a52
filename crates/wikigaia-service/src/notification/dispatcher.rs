//! Milestone notification dispatch.
//!
//! For each crossed threshold the dispatcher first claims the milestone
//! record. Only the caller holding the claim sends; every other caller sees
//! the record and skips. A claim whose notifications never went out expires
//! after the claim lease, and the next dispatch takes it over. Within a
//! claimed threshold each recipient is handled independently, and the record
//! is flagged notified once the proposer's notification has gone out.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use wikigaia_core::error::AppError;
use wikigaia_core::result::AppResult;
use wikigaia_core::types::{NotificationId, ProblemId, UserId};
use wikigaia_database::store::{
    MilestoneClaim, MilestoneStore, NotificationStore, ProblemStore, UserStore,
};
use wikigaia_entity::notification::{CreateNotification, NotificationKind};
use wikigaia_entity::problem::Problem;

use super::sink::NotificationSink;
use super::template;

/// How one dispatch step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// Recorded and delivered.
    Sent,
    /// The milestone's notifications were sent earlier.
    AlreadyNotified,
    /// Another writer holds a fresh claim on the milestone record.
    InProgress,
    /// The step failed; see `error`.
    Failed,
}

/// Result of one dispatch step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResult {
    /// The threshold this step belongs to.
    pub threshold: i64,
    /// Outcome.
    pub outcome: NotificationOutcome,
    /// Recipient, when the step concerned one.
    pub recipient_id: Option<UserId>,
    /// Notification kind, when the step concerned one.
    pub kind: Option<NotificationKind>,
    /// The recorded notification, if it was recorded.
    pub notification_id: Option<NotificationId>,
    /// Failure description.
    pub error: Option<String>,
}

impl NotificationResult {
    fn skipped(threshold: i64, outcome: NotificationOutcome) -> Self {
        Self {
            threshold,
            outcome,
            recipient_id: None,
            kind: None,
            notification_id: None,
            error: None,
        }
    }

    fn failed(threshold: i64, kind: Option<NotificationKind>, err: &AppError) -> Self {
        Self {
            threshold,
            outcome: NotificationOutcome::Failed,
            recipient_id: None,
            kind,
            notification_id: None,
            error: Some(err.to_string()),
        }
    }

    /// Whether this step delivered a notification.
    pub fn is_sent(&self) -> bool {
        self.outcome == NotificationOutcome::Sent
    }
}

/// Creates and delivers milestone notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    problems: Arc<dyn ProblemStore>,
    milestones: Arc<dyn MilestoneStore>,
    notifications: Arc<dyn NotificationStore>,
    users: Arc<dyn UserStore>,
    sink: Arc<dyn NotificationSink>,
    max_threshold: Option<i64>,
    claim_lease: Duration,
}

impl NotificationDispatcher {
    /// Creates a new dispatcher. `max_threshold` is the threshold that also
    /// alerts every admin.
    pub fn new(
        problems: Arc<dyn ProblemStore>,
        milestones: Arc<dyn MilestoneStore>,
        notifications: Arc<dyn NotificationStore>,
        users: Arc<dyn UserStore>,
        sink: Arc<dyn NotificationSink>,
        max_threshold: Option<i64>,
    ) -> Self {
        Self {
            problems,
            milestones,
            notifications,
            users,
            sink,
            max_threshold,
            claim_lease: Duration::minutes(10),
        }
    }

    /// How long an unsent claim blocks other senders.
    pub fn with_claim_lease(mut self, lease: Duration) -> Self {
        self.claim_lease = lease;
        self
    }

    /// Dispatch notifications for every threshold in `crossed`.
    pub async fn dispatch(
        &self,
        problem_id: ProblemId,
        crossed: &BTreeSet<i64>,
    ) -> Vec<NotificationResult> {
        if crossed.is_empty() {
            return Vec::new();
        }

        let problem = match self.problems.find_by_id(problem_id).await {
            Ok(Some(problem)) => problem,
            Ok(None) => {
                let err = AppError::not_found(format!("Problem {problem_id} not found"));
                warn!(%problem_id, "Milestone dispatch for unknown problem");
                return crossed
                    .iter()
                    .map(|t| NotificationResult::failed(*t, None, &err))
                    .collect();
            }
            Err(err) => {
                error!(%problem_id, error = %err, "Failed to load problem for milestone dispatch");
                return crossed
                    .iter()
                    .map(|t| NotificationResult::failed(*t, None, &err))
                    .collect();
            }
        };

        let mut results = Vec::new();
        for threshold in crossed {
            results.extend(self.dispatch_threshold(&problem, *threshold).await);
        }
        results
    }

    async fn dispatch_threshold(&self, problem: &Problem, threshold: i64) -> Vec<NotificationResult> {
        let problem_id = problem.id;
        let stale_before = Utc::now() - self.claim_lease;
        let record = match self
            .milestones
            .claim(problem_id, threshold, stale_before)
            .await
        {
            Ok(MilestoneClaim::Claimed(record)) => record,
            Ok(MilestoneClaim::AlreadyNotified(_)) => {
                debug!(%problem_id, threshold, "Milestone already notified");
                return vec![NotificationResult::skipped(
                    threshold,
                    NotificationOutcome::AlreadyNotified,
                )];
            }
            Ok(MilestoneClaim::InProgress(_)) => {
                debug!(%problem_id, threshold, "Milestone claimed by another writer");
                return vec![NotificationResult::skipped(
                    threshold,
                    NotificationOutcome::InProgress,
                )];
            }
            Err(err) => {
                error!(%problem_id, threshold, error = %err, "Failed to claim milestone");
                return vec![NotificationResult::failed(threshold, None, &err)];
            }
        };

        let mut results = Vec::new();
        let proposer = self
            .send(threshold, template::milestone_reached(problem, threshold))
            .await;
        let proposer_sent = proposer.is_sent();
        results.push(proposer);

        if self.max_threshold == Some(threshold) {
            match self.users.find_admins().await {
                Ok(admins) => {
                    for admin in admins {
                        results.push(
                            self.send(threshold, template::admin_alert(problem, threshold, admin.id))
                                .await,
                        );
                    }
                }
                Err(err) => {
                    error!(%problem_id, threshold, error = %err, "Failed to load admins");
                    results.push(NotificationResult::failed(
                        threshold,
                        Some(NotificationKind::AdminMilestoneAlert),
                        &err,
                    ));
                }
            }
        }

        if proposer_sent {
            if let Err(err) = self.milestones.mark_notified(record.id).await {
                error!(%problem_id, threshold, error = %err, "Failed to mark milestone notified");
            } else {
                info!(%problem_id, threshold, "Milestone notified");
            }
        } else {
            warn!(%problem_id, threshold, "Milestone left unsent");
        }

        results
    }

    /// Record, deliver, and mark one notification.
    async fn send(&self, threshold: i64, data: CreateNotification) -> NotificationResult {
        let recipient_id = data.recipient_id;
        let kind = data.kind;
        let mut result = NotificationResult {
            threshold,
            outcome: NotificationOutcome::Sent,
            recipient_id: Some(recipient_id),
            kind: Some(kind),
            notification_id: None,
            error: None,
        };

        if let Err(err) = self.record_and_deliver(&data, &mut result.notification_id).await {
            warn!(
                %recipient_id,
                %kind,
                threshold,
                error = %err,
                "Notification failed"
            );
            result.outcome = NotificationOutcome::Failed;
            result.error = Some(err.to_string());
        }
        result
    }

    async fn record_and_deliver(
        &self,
        data: &CreateNotification,
        recorded: &mut Option<NotificationId>,
    ) -> AppResult<()> {
        let notification = self.notifications.create(data).await?;
        *recorded = Some(notification.id);
        self.sink.deliver(&notification).await?;
        self.notifications.mark_sent(notification.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use wikigaia_core::types::PageRequest;
    use wikigaia_database::Stores;
    use wikigaia_entity::notification::Notification;
    use wikigaia_entity::problem::CreateProblem;
    use wikigaia_entity::user::UserRole;

    /// Fails delivery for the listed recipients.
    #[derive(Default)]
    struct FlakySink {
        failing: Mutex<Vec<UserId>>,
        delivered: Mutex<Vec<NotificationId>>,
    }

    #[async_trait]
    impl NotificationSink for FlakySink {
        async fn deliver(&self, notification: &Notification) -> AppResult<()> {
            if self
                .failing
                .lock()
                .expect("lock")
                .contains(&notification.recipient_id)
            {
                return Err(AppError::service_unavailable("mail relay down"));
            }
            self.delivered.lock().expect("lock").push(notification.id);
            Ok(())
        }
    }

    struct Fixture {
        stores: Stores,
        sink: Arc<FlakySink>,
        dispatcher: NotificationDispatcher,
        proposer: UserId,
        problem_id: ProblemId,
    }

    async fn fixture(admins: usize) -> Fixture {
        let stores = Stores::in_memory();
        let proposer = UserId::new();
        stores
            .users
            .upsert(proposer, None, UserRole::User)
            .await
            .expect("proposer");
        for _ in 0..admins {
            stores
                .users
                .upsert(UserId::new(), None, UserRole::Admin)
                .await
                .expect("admin");
        }
        let problem = stores
            .problems
            .create_with_creator_vote(&CreateProblem {
                title: "Solar co-ops".to_string(),
                description: "Community owned solar".to_string(),
                category_id: None,
                proposer_id: proposer,
            })
            .await
            .expect("problem");
        let sink = Arc::new(FlakySink::default());
        let dispatcher = NotificationDispatcher::new(
            stores.problems.clone(),
            stores.milestones.clone(),
            stores.notifications.clone(),
            stores.users.clone(),
            sink.clone(),
            Some(100),
        );
        Fixture {
            stores,
            sink,
            dispatcher,
            proposer,
            problem_id: problem.id,
        }
    }

    fn crossed(values: &[i64]) -> BTreeSet<i64> {
        values.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_dispatch_is_idempotent_per_threshold() {
        let f = fixture(0).await;
        let first = f.dispatcher.dispatch(f.problem_id, &crossed(&[50])).await;
        assert_eq!(first.len(), 1);
        assert!(first[0].is_sent());
        assert_eq!(first[0].recipient_id, Some(f.proposer));

        let second = f.dispatcher.dispatch(f.problem_id, &crossed(&[50])).await;
        assert_eq!(second[0].outcome, NotificationOutcome::AlreadyNotified);

        let inbox = f
            .stores
            .notifications
            .find_by_recipient(f.proposer, &PageRequest::default())
            .await
            .expect("inbox");
        assert_eq!(inbox.total_items, 1);
        assert!(inbox.items[0].is_sent());
        let records = f
            .stores
            .milestones
            .find_by_problem(f.problem_id)
            .await
            .expect("records");
        assert_eq!(records.len(), 1);
        assert!(records[0].notification_sent);
    }

    #[tokio::test]
    async fn test_top_threshold_alerts_each_admin() {
        let f = fixture(2).await;
        let results = f
            .dispatcher
            .dispatch(f.problem_id, &crossed(&[50, 75, 100]))
            .await;
        let admin_alerts = results
            .iter()
            .filter(|r| r.kind == Some(NotificationKind::AdminMilestoneAlert))
            .count();
        assert_eq!(admin_alerts, 2);
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(NotificationResult::is_sent));
    }

    #[tokio::test]
    async fn test_admin_failure_is_isolated() {
        let f = fixture(2).await;
        let admins = f.stores.users.find_admins().await.expect("admins");
        f.sink.failing.lock().expect("lock").push(admins[0].id);

        let results = f.dispatcher.dispatch(f.problem_id, &crossed(&[100])).await;
        let failed: Vec<_> = results
            .iter()
            .filter(|r| r.outcome == NotificationOutcome::Failed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].recipient_id, Some(admins[0].id));
        assert!(failed[0].notification_id.is_some());
        assert_eq!(f.sink.delivered.lock().expect("lock").len(), 2);

        let records = f
            .stores
            .milestones
            .find_by_problem(f.problem_id)
            .await
            .expect("records");
        assert!(records[0].notification_sent);
    }

    #[tokio::test]
    async fn test_failed_proposer_delivery_is_retried_after_lease() {
        let f = fixture(0).await;
        f.sink.failing.lock().expect("lock").push(f.proposer);

        let results = f.dispatcher.dispatch(f.problem_id, &crossed(&[50])).await;
        assert_eq!(results[0].outcome, NotificationOutcome::Failed);

        let records = f
            .stores
            .milestones
            .find_by_problem(f.problem_id)
            .await
            .expect("records");
        assert!(!records[0].notification_sent);

        // Inside the lease the failed claim still blocks other senders.
        let blocked = f.dispatcher.dispatch(f.problem_id, &crossed(&[50])).await;
        assert_eq!(blocked[0].outcome, NotificationOutcome::InProgress);

        f.sink.failing.lock().expect("lock").clear();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let expired = f.dispatcher.clone().with_claim_lease(Duration::zero());
        let retry = expired.dispatch(f.problem_id, &crossed(&[50])).await;
        assert_eq!(retry.len(), 1);
        assert!(retry[0].is_sent());

        let records = f
            .stores
            .milestones
            .find_by_problem(f.problem_id)
            .await
            .expect("records");
        assert_eq!(records.len(), 1);
        assert!(records[0].notification_sent);

        let again = expired.dispatch(f.problem_id, &crossed(&[50])).await;
        assert_eq!(again[0].outcome, NotificationOutcome::AlreadyNotified);
    }

    #[tokio::test]
    async fn test_unknown_problem_fails_every_threshold() {
        let f = fixture(0).await;
        let results = f
            .dispatcher
            .dispatch(ProblemId::new(), &crossed(&[50, 75]))
            .await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.outcome == NotificationOutcome::Failed));
    }
}
