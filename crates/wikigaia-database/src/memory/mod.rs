//! In-memory store.
//!
//! Mirrors the PostgreSQL schema's behavior: the vote-count trigger, the
//! self-vote trigger, and every unique constraint the service relies on.
//! Each trait method takes the state lock once, so a mutation and its
//! count maintenance are atomic.

mod state;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use wikigaia_core::error::AppError;
use wikigaia_core::result::AppResult;
use wikigaia_core::types::{
    MilestoneId, NotificationId, PageRequest, PageResponse, ProblemId, UserId, VoteId,
};
use wikigaia_entity::milestone::MilestoneRecord;
use wikigaia_entity::notification::{CreateNotification, Notification};
use wikigaia_entity::problem::{CreateProblem, ModerationStatus, Problem, ProblemStatus};
use wikigaia_entity::user::{User, UserRole};
use wikigaia_entity::vote::{Vote, VoteType};

use self::state::MemoryState;
use crate::repositories::{DUPLICATE_VOTE_MESSAGE, SELF_VOTE_MESSAGE};
use crate::store::{
    MilestoneClaim, MilestoneStore, NotificationStore, ProblemStore, UserStore, VoteCountDrift,
    VoteStore,
};

/// Process-local store implementing every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store behind an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Overwrite a problem's stored count, bypassing the trigger emulation.
    ///
    /// Only useful for exercising the vote-count audit.
    pub async fn corrupt_vote_count(&self, id: ProblemId, vote_count: i64) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let problem = state
            .problems
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Problem {id} not found")))?;
        problem.vote_count = vote_count;
        Ok(())
    }

    /// Set a problem's soft-deactivation flag.
    pub async fn set_active(&self, id: ProblemId, active: bool) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let problem = state
            .problems
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Problem {id} not found")))?;
        problem.is_active = active;
        problem.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl ProblemStore for MemoryStore {
    async fn create_with_creator_vote(&self, data: &CreateProblem) -> AppResult<Problem> {
        let mut state = self.state.lock().await;
        state.require_user(data.proposer_id)?;

        let now = Utc::now();
        let problem = Problem {
            id: ProblemId::new(),
            title: data.title.clone(),
            description: data.description.clone(),
            category_id: data.category_id,
            proposer_id: data.proposer_id,
            status: ProblemStatus::Proposed,
            vote_count: 0,
            moderation_status: ModerationStatus::Pending,
            is_featured: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let id = problem.id;
        state.problems.insert(id, problem);
        state.insert_vote(data.proposer_id, id, VoteType::CreatorInterest)?;

        state
            .problems
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::internal("Problem vanished during creation"))
    }

    async fn find_by_id(&self, id: ProblemId) -> AppResult<Option<Problem>> {
        Ok(self.state.lock().await.problems.get(&id).cloned())
    }

    async fn vote_counts(&self, ids: &[ProblemId]) -> AppResult<Vec<(ProblemId, i64)>> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.problems.get(id))
            .filter(|p| p.is_active)
            .map(|p| (p.id, p.vote_count))
            .collect())
    }

    async fn advance_status(
        &self,
        id: ProblemId,
        from: ProblemStatus,
        to: ProblemStatus,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.problems.get_mut(&id) {
            Some(problem) if problem.status == from => {
                problem.status = to;
                problem.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_vote_count_drift(&self) -> AppResult<Vec<VoteCountDrift>> {
        let state = self.state.lock().await;
        let mut drift: Vec<VoteCountDrift> = state
            .problems
            .values()
            .filter_map(|p| {
                let actual = state.votes.values().filter(|v| v.problem_id == p.id).count() as i64;
                (actual != p.vote_count).then_some(VoteCountDrift {
                    problem_id: p.id,
                    stored_count: p.vote_count,
                    actual_count: actual,
                })
            })
            .collect();
        drift.sort_by_key(|d| d.problem_id);
        Ok(drift)
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn find_user_votes(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
    ) -> AppResult<Vec<Vote>> {
        let state = self.state.lock().await;
        let mut votes: Vec<Vote> = state
            .votes
            .values()
            .filter(|v| v.user_id == user_id && v.problem_id == problem_id)
            .cloned()
            .collect();
        votes.sort_by_key(|v| v.created_at);
        Ok(votes)
    }

    async fn insert(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        vote_type: VoteType,
    ) -> AppResult<Vote> {
        self.state
            .lock()
            .await
            .insert_vote(user_id, problem_id, vote_type)
    }

    async fn delete(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        vote_type: VoteType,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.votes.remove(&(user_id, problem_id, vote_type)).is_none() {
            return Ok(false);
        }
        if let Some(problem) = state.problems.get_mut(&problem_id) {
            problem.vote_count = (problem.vote_count - 1).max(0);
            problem.updated_at = Utc::now();
        }
        Ok(true)
    }
}

#[async_trait]
impl MilestoneStore for MemoryStore {
    async fn claim(
        &self,
        problem_id: ProblemId,
        threshold: i64,
        stale_before: DateTime<Utc>,
    ) -> AppResult<MilestoneClaim> {
        let mut state = self.state.lock().await;
        if !state.problems.contains_key(&problem_id) {
            return Err(AppError::database(format!(
                "Milestone references unknown problem {problem_id}"
            )));
        }
        if let Some(existing) = state.milestones.get_mut(&(problem_id, threshold)) {
            if !existing.notification_sent && existing.claimed_at < stale_before {
                existing.claimed_at = Utc::now();
                return Ok(MilestoneClaim::Claimed(existing.clone()));
            }
            return Ok(MilestoneClaim::from_existing(existing.clone()));
        }
        let now = Utc::now();
        let record = MilestoneRecord {
            id: MilestoneId::new(),
            problem_id,
            threshold,
            achieved_at: now,
            claimed_at: now,
            notification_sent: false,
            notified_at: None,
        };
        state
            .milestones
            .insert((problem_id, threshold), record.clone());
        Ok(MilestoneClaim::Claimed(record))
    }

    async fn mark_notified(&self, id: MilestoneId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(record) = state.milestones.values_mut().find(|m| m.id == id) {
            record.notification_sent = true;
            record.notified_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn find_by_problem(&self, problem_id: ProblemId) -> AppResult<Vec<MilestoneRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .milestones
            .range((problem_id, i64::MIN)..=(problem_id, i64::MAX))
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn find_unsent(&self, before: DateTime<Utc>) -> AppResult<Vec<MilestoneRecord>> {
        let state = self.state.lock().await;
        let mut unsent: Vec<MilestoneRecord> = state
            .milestones
            .values()
            .filter(|m| !m.notification_sent && m.claimed_at < before)
            .cloned()
            .collect();
        unsent.sort_by_key(|m| m.claimed_at);
        Ok(unsent)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, data: &CreateNotification) -> AppResult<Notification> {
        let mut state = self.state.lock().await;
        state.require_user(data.recipient_id)?;
        let notification = Notification {
            id: NotificationId::new(),
            recipient_id: data.recipient_id,
            kind: data.kind.as_str().to_string(),
            title: data.title.clone(),
            message: data.message.clone(),
            payload: data.payload.clone(),
            problem_id: data.problem_id,
            created_at: Utc::now(),
            sent_at: None,
            read_at: None,
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn mark_sent(&self, id: NotificationId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
            n.sent_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn find_by_recipient(
        &self,
        recipient_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let state = self.state.lock().await;
        // Insertion order is creation order; newest first.
        let mine: Vec<&Notification> = state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.recipient_id == recipient_id)
            .collect();
        let total = mine.len() as u64;
        let items = mine
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn mark_read(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient_id)
        {
            Some(n) => {
                n.read_at.get_or_insert_with(Utc::now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_older_than(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before_len = state.notifications.len();
        state.notifications.retain(|n| n.created_at >= before);
        Ok((before_len - state.notifications.len()) as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn upsert(&self, id: UserId, email: Option<&str>, role: UserRole) -> AppResult<User> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let user = state.users.entry(id).or_insert_with(|| User {
            id,
            email: None,
            role,
            created_at: now,
            updated_at: now,
        });
        if let Some(email) = email {
            user.email = Some(email.to_string());
        }
        user.role = role;
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_admins(&self) -> AppResult<Vec<User>> {
        let state = self.state.lock().await;
        let mut admins: Vec<User> = state
            .users
            .values()
            .filter(|u| u.is_admin())
            .cloned()
            .collect();
        admins.sort_by_key(|u| u.created_at);
        Ok(admins)
    }
}

/// Build the vote row inserted by [`MemoryState::insert_vote`].
fn new_vote(user_id: UserId, problem_id: ProblemId, vote_type: VoteType) -> Vote {
    Vote {
        id: VoteId::new(),
        user_id,
        problem_id,
        vote_type,
        created_at: Utc::now(),
    }
}

impl MemoryState {
    /// Insert a vote, applying the self-vote trigger, the unique key, and the
    /// count trigger.
    fn insert_vote(
        &mut self,
        user_id: UserId,
        problem_id: ProblemId,
        vote_type: VoteType,
    ) -> AppResult<Vote> {
        self.require_user(user_id)?;
        let problem = self.problems.get(&problem_id).ok_or_else(|| {
            AppError::database(format!("Vote references unknown problem {problem_id}"))
        })?;
        if vote_type.forbids_self_vote() && problem.proposer_id == user_id {
            return Err(AppError::rule_violation(SELF_VOTE_MESSAGE));
        }
        let key = (user_id, problem_id, vote_type);
        if self.votes.contains_key(&key) {
            return Err(AppError::rule_violation(DUPLICATE_VOTE_MESSAGE));
        }

        let vote = new_vote(user_id, problem_id, vote_type);
        self.votes.insert(key, vote.clone());
        if let Some(problem) = self.problems.get_mut(&problem_id) {
            problem.vote_count += 1;
            problem.updated_at = vote.created_at;
        }
        Ok(vote)
    }

    /// Foreign-key check against the identity mirror.
    fn require_user(&self, id: UserId) -> AppResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::database(format!("Unknown user {id}")))
        }
    }
}
