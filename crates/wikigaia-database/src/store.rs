//! Store traits used by the service layer.
//!
//! Each trait covers one table. [`Stores`] bundles one implementation of
//! each behind `Arc<dyn _>` so the service layer never names a backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wikigaia_core::config::{DatabaseBackend, DatabaseConfig};
use wikigaia_core::result::AppResult;
use wikigaia_core::types::{MilestoneId, NotificationId, PageRequest, PageResponse, ProblemId, UserId};
use wikigaia_entity::milestone::MilestoneRecord;
use wikigaia_entity::notification::{CreateNotification, Notification};
use wikigaia_entity::problem::{CreateProblem, Problem, ProblemStatus};
use wikigaia_entity::user::{User, UserRole};
use wikigaia_entity::vote::{Vote, VoteType};

use crate::connection::{open_pool, ping};
use crate::memory::MemoryStore;
use crate::repositories::{
    MilestoneRepository, NotificationRepository, ProblemRepository, UserRepository,
    VoteRepository,
};

/// A problem whose stored `vote_count` disagrees with its vote rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct VoteCountDrift {
    /// The problem.
    pub problem_id: ProblemId,
    /// `problems.vote_count`.
    pub stored_count: i64,
    /// Number of rows in `votes`.
    pub actual_count: i64,
}

/// Result of trying to claim a milestone record.
#[derive(Debug, Clone)]
pub enum MilestoneClaim {
    /// This caller created or took over the record and owns sending its
    /// notifications.
    Claimed(MilestoneRecord),
    /// The record exists and its notifications were sent.
    AlreadyNotified(MilestoneRecord),
    /// The record is unsent and another writer's claim is still fresh.
    InProgress(MilestoneRecord),
}

impl MilestoneClaim {
    /// Classify an existing record that could not be claimed.
    pub fn from_existing(record: MilestoneRecord) -> Self {
        if record.notification_sent {
            Self::AlreadyNotified(record)
        } else {
            Self::InProgress(record)
        }
    }
}

/// Problem persistence.
#[async_trait]
pub trait ProblemStore: Send + Sync + 'static {
    /// Insert a problem and its proposer's `creator_interest` vote atomically.
    async fn create_with_creator_vote(&self, data: &CreateProblem) -> AppResult<Problem>;

    /// Find a problem by id, including inactive ones.
    async fn find_by_id(&self, id: ProblemId) -> AppResult<Option<Problem>>;

    /// Current store-maintained vote counts for the active problems among `ids`.
    async fn vote_counts(&self, ids: &[ProblemId]) -> AppResult<Vec<(ProblemId, i64)>>;

    /// Move `id` from `from` to `to`; returns `false` when the status was no
    /// longer `from`.
    async fn advance_status(
        &self,
        id: ProblemId,
        from: ProblemStatus,
        to: ProblemStatus,
    ) -> AppResult<bool>;

    /// Problems whose `vote_count` disagrees with the number of vote rows.
    async fn find_vote_count_drift(&self) -> AppResult<Vec<VoteCountDrift>>;
}

/// Vote persistence. `problems.vote_count` is maintained by the store.
#[async_trait]
pub trait VoteStore: Send + Sync + 'static {
    /// All votes the user holds on the problem.
    async fn find_user_votes(&self, user_id: UserId, problem_id: ProblemId)
    -> AppResult<Vec<Vote>>;

    /// Insert a vote. Self-votes and duplicates surface as rule violations.
    async fn insert(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        vote_type: VoteType,
    ) -> AppResult<Vote>;

    /// Delete a vote; returns whether a row was removed.
    async fn delete(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        vote_type: VoteType,
    ) -> AppResult<bool>;
}

/// Milestone record persistence.
#[async_trait]
pub trait MilestoneStore: Send + Sync + 'static {
    /// Create the record for `(problem_id, threshold)` unless it exists.
    ///
    /// An existing unsent record whose claim was taken before `stale_before`
    /// is taken over and its `claimed_at` reset.
    async fn claim(
        &self,
        problem_id: ProblemId,
        threshold: i64,
        stale_before: DateTime<Utc>,
    ) -> AppResult<MilestoneClaim>;

    /// Flag the record's notifications as sent.
    async fn mark_notified(&self, id: MilestoneId) -> AppResult<()>;

    /// All records for a problem, ascending by threshold.
    async fn find_by_problem(&self, problem_id: ProblemId) -> AppResult<Vec<MilestoneRecord>>;

    /// Unsent records whose claim was taken before `before`.
    async fn find_unsent(&self, before: DateTime<Utc>) -> AppResult<Vec<MilestoneRecord>>;
}

/// Notification persistence.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Record a notification.
    async fn create(&self, data: &CreateNotification) -> AppResult<Notification>;

    /// Set `sent_at`.
    async fn mark_sent(&self, id: NotificationId) -> AppResult<()>;

    /// A recipient's notifications, newest first.
    async fn find_by_recipient(
        &self,
        recipient_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Set `read_at` on one of the recipient's notifications.
    async fn mark_read(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool>;

    /// Delete notifications created before `before`.
    async fn delete_older_than(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Identity mirror persistence.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Insert or refresh the mirror row for an identity-provider user.
    async fn upsert(&self, id: UserId, email: Option<&str>, role: UserRole) -> AppResult<User>;

    /// Find a user by id.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// All admins.
    async fn find_admins(&self) -> AppResult<Vec<User>>;
}

/// One implementation of every store trait.
#[derive(Clone)]
pub struct Stores {
    /// Problems.
    pub problems: Arc<dyn ProblemStore>,
    /// Votes.
    pub votes: Arc<dyn VoteStore>,
    /// Milestone records.
    pub milestones: Arc<dyn MilestoneStore>,
    /// Notifications.
    pub notifications: Arc<dyn NotificationStore>,
    /// Identity mirror.
    pub users: Arc<dyn UserStore>,
    pool: Option<PgPool>,
}

impl Stores {
    /// Stores backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            problems: Arc::new(ProblemRepository::new(pool.clone())),
            votes: Arc::new(VoteRepository::new(pool.clone())),
            milestones: Arc::new(MilestoneRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Stores backed by one shared [`MemoryStore`].
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            problems: store.clone(),
            votes: store.clone(),
            milestones: store.clone(),
            notifications: store.clone(),
            users: store,
            pool: None,
        }
    }

    /// Fresh, empty in-memory stores.
    pub fn in_memory() -> Self {
        Self::memory(Arc::new(MemoryStore::new()))
    }

    /// Build the stores selected by configuration.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            DatabaseBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                Ok(Self::in_memory())
            }
            DatabaseBackend::Postgres => {
                let pool = open_pool(config).await?;
                Ok(Self::postgres(pool))
            }
        }
    }

    /// Name of the active backend.
    pub fn backend_name(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Check store connectivity.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => ping(pool).await,
            None => Ok(true),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("Store pool closed");
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("backend", &self.backend_name())
            .finish()
    }
}
