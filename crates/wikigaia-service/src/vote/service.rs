//! Community vote toggle and vote status lookup.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use wikigaia_core::error::AppError;
use wikigaia_core::events::{DomainEvent, EventPayload, VoteAction, VoteEvent};
use wikigaia_core::result::AppResult;
use wikigaia_core::traits::EventPublisher;
use wikigaia_core::types::ProblemId;
use wikigaia_database::store::{ProblemStore, VoteStore};
use wikigaia_entity::problem::Problem;
use wikigaia_entity::vote::VoteType;

use crate::context::RequestContext;
use crate::user::UserService;

/// The caller's vote on a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    /// Whether the caller holds any vote on the problem.
    pub has_voted: bool,
    /// The community vote if present, otherwise the creator-interest vote.
    pub vote_type: Option<VoteType>,
}

/// Result of a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    /// Whether the community vote was added or removed.
    pub action: VoteAction,
    /// Whether the caller holds a community vote afterwards.
    pub has_voted: bool,
    /// Store-maintained count read back after the mutation.
    pub vote_count: i64,
    /// Count before the mutation.
    pub previous_count: i64,
}

/// Inserts or removes the caller's community vote.
///
/// The mutation is one store insert or delete; the count is never written
/// here. Downstream effects are handed to the [`EventPublisher`] and never
/// affect the outcome.
#[derive(Clone)]
pub struct VoteService {
    problems: Arc<dyn ProblemStore>,
    votes: Arc<dyn VoteStore>,
    users: UserService,
    publisher: Arc<dyn EventPublisher>,
}

impl VoteService {
    /// Creates a new vote service.
    pub fn new(
        problems: Arc<dyn ProblemStore>,
        votes: Arc<dyn VoteStore>,
        users: UserService,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            problems,
            votes,
            users,
            publisher,
        }
    }

    /// Report the caller's vote on a problem.
    pub async fn status(&self, ctx: &RequestContext, problem_id: ProblemId) -> AppResult<VoteStatus> {
        self.active_problem(problem_id).await?;
        let votes = self.votes.find_user_votes(ctx.user_id, problem_id).await?;

        let vote_type = votes
            .iter()
            .find(|v| v.vote_type == VoteType::Community)
            .or_else(|| votes.first())
            .map(|v| v.vote_type);

        Ok(VoteStatus {
            has_voted: vote_type.is_some(),
            vote_type,
        })
    }

    /// Toggle the caller's community vote.
    pub async fn toggle(
        &self,
        ctx: &RequestContext,
        problem_id: ProblemId,
    ) -> AppResult<ToggleOutcome> {
        self.active_problem(problem_id).await?;
        self.users.sync(ctx).await?;

        let existing = self
            .votes
            .find_user_votes(ctx.user_id, problem_id)
            .await?
            .into_iter()
            .any(|v| v.vote_type == VoteType::Community);

        let action = if existing {
            let removed = self
                .votes
                .delete(ctx.user_id, problem_id, VoteType::Community)
                .await
                .map_err(|e| log_store_failure(e, ctx, problem_id))?;
            if !removed {
                warn!(%problem_id, user_id = %ctx.user_id, "Vote already removed by a concurrent toggle");
            }
            VoteAction::Removed
        } else {
            self.votes
                .insert(ctx.user_id, problem_id, VoteType::Community)
                .await
                .map_err(|e| log_store_failure(e, ctx, problem_id))?;
            VoteAction::Added
        };

        let vote_count = self
            .problems
            .find_by_id(problem_id)
            .await?
            .map(|p| p.vote_count)
            .ok_or_else(|| AppError::not_found(format!("Problem {problem_id} not found")))?;
        let previous_count = action.previous_count(vote_count);

        info!(
            %problem_id,
            user_id = %ctx.user_id,
            %action,
            vote_count,
            "Vote toggled"
        );

        let event = DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Vote(VoteEvent::Changed {
                problem_id,
                user_id: ctx.user_id,
                action,
                old_count: previous_count,
                new_count: vote_count,
            }),
        );
        if let Err(e) = self.publisher.publish(event).await {
            warn!(%problem_id, error = %e, "Failed to publish vote event");
        }

        Ok(ToggleOutcome {
            action,
            has_voted: action.has_voted(),
            vote_count,
            previous_count,
        })
    }

    async fn active_problem(&self, problem_id: ProblemId) -> AppResult<Problem> {
        self.problems
            .find_by_id(problem_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::not_found(format!("Problem {problem_id} not found")))
    }
}

/// Rule violations pass through silently; anything else is logged here with
/// the vote's context before propagating.
fn log_store_failure(err: AppError, ctx: &RequestContext, problem_id: ProblemId) -> AppError {
    if !err.kind.is_client_error() {
        error!(
            %problem_id,
            user_id = %ctx.user_id,
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            error = %err,
            "Vote mutation failed"
        );
    }
    err
}
