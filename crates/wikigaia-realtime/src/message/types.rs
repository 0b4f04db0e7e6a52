//! Events pushed to vote-stream clients.

use chrono::{DateTime, Utc};
use serde::Serialize;

use wikigaia_core::types::{ConnectionId, ProblemId, UserId};

/// One event on a vote stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum VoteStreamEvent {
    /// First event on every stream.
    Connected {
        /// The connection.
        connection_id: ConnectionId,
        /// Accepted subscriptions.
        problem_ids: Vec<ProblemId>,
        /// Subscriptions dropped as malformed or over the limit.
        rejected_ids: Vec<String>,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Current count for one subscribed problem, sent right after connecting.
    InitialVoteCount {
        /// The problem.
        problem_id: ProblemId,
        /// Store-maintained count.
        vote_count: i64,
    },
    /// A vote mutation on a subscribed problem.
    VoteUpdate {
        /// The problem.
        problem_id: ProblemId,
        /// Count after the mutation.
        vote_count: i64,
        /// Whether the acting user holds a vote afterwards.
        has_voted: bool,
        /// The acting user.
        user_id: Option<UserId>,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Heartbeat.
    Ping {
        /// Server time.
        timestamp: DateTime<Utc>,
    },
}

impl VoteStreamEvent {
    /// Event name used for SSE framing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::InitialVoteCount { .. } => "initial_vote_count",
            Self::VoteUpdate { .. } => "vote_update",
            Self::Ping { .. } => "ping",
        }
    }
}
