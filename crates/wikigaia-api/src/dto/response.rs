//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use wikigaia_core::events::VoteAction;
use wikigaia_core::types::{CategoryId, MilestoneId, NotificationId, ProblemId, UserId};
use wikigaia_entity::milestone::MilestoneRecord;
use wikigaia_entity::notification::Notification;
use wikigaia_entity::problem::{ModerationStatus, Problem, ProblemStatus};
use wikigaia_realtime::BroadcasterStats;
use wikigaia_service::ToggleOutcome;

/// Basic health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `ok`.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Health with dependency details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Active store backend.
    pub store_backend: String,
    /// Whether the store answered.
    pub store_healthy: bool,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Vote stream counters.
    pub realtime: BroadcasterStats,
}

/// A problem.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemResponse {
    /// ID.
    pub id: ProblemId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category_id: Option<CategoryId>,
    /// Proposer.
    pub proposer_id: UserId,
    /// Lifecycle status.
    pub status: ProblemStatus,
    /// Store-maintained vote count.
    pub vote_count: i64,
    /// Moderation status.
    pub moderation_status: ModerationStatus,
    /// Featured flag.
    pub is_featured: bool,
    /// Created.
    pub created_at: DateTime<Utc>,
    /// Updated.
    pub updated_at: DateTime<Utc>,
}

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            category_id: p.category_id,
            proposer_id: p.proposer_id,
            status: p.status,
            vote_count: p.vote_count,
            moderation_status: p.moderation_status,
            is_featured: p.is_featured,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Result of a vote toggle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteToggleResponse {
    /// `added` or `removed`.
    pub action: VoteAction,
    /// Whether the caller holds a community vote afterwards.
    pub has_voted: bool,
    /// Count after the toggle.
    pub vote_count: i64,
}

impl From<ToggleOutcome> for VoteToggleResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            action: outcome.action,
            has_voted: outcome.has_voted,
            vote_count: outcome.vote_count,
        }
    }
}

/// A milestone record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneResponse {
    /// ID.
    pub id: MilestoneId,
    /// Threshold reached.
    pub threshold: i64,
    /// When it was reached.
    pub achieved_at: DateTime<Utc>,
    /// Whether the notifications went out.
    pub notification_sent: bool,
    /// When they went out.
    pub notified_at: Option<DateTime<Utc>>,
}

impl From<MilestoneRecord> for MilestoneResponse {
    fn from(m: MilestoneRecord) -> Self {
        Self {
            id: m.id,
            threshold: m.threshold,
            achieved_at: m.achieved_at,
            notification_sent: m.notification_sent,
            notified_at: m.notified_at,
        }
    }
}

/// A notification in the caller's inbox.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    /// ID.
    pub id: NotificationId,
    /// Kind, e.g. `milestone_reached`.
    pub kind: String,
    /// Title.
    pub title: String,
    /// Body.
    pub message: String,
    /// Structured details.
    pub payload: serde_json::Value,
    /// Related problem.
    pub problem_id: Option<ProblemId>,
    /// Created.
    pub created_at: DateTime<Utc>,
    /// Delivered.
    pub sent_at: Option<DateTime<Utc>>,
    /// Read.
    pub read_at: Option<DateTime<Utc>>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            payload: n.payload,
            problem_id: n.problem_id,
            created_at: n.created_at,
            sent_at: n.sent_at,
            read_at: n.read_at,
        }
    }
}

/// Result of a manual broadcast.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResponse {
    /// Always `true` once the push ran.
    pub success: bool,
    /// Connections that accepted the event.
    pub broadcast_to: usize,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}
