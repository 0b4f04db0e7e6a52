//! Individual vote-stream connection handle.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;

use wikigaia_core::types::{ConnectionId, ProblemId, UserId};

use crate::message::types::VoteStreamEvent;

/// A handle to a single open stream.
///
/// Holds the sender half of the connection's outbound channel. The stream
/// ends once every handle clone is dropped, which is what eviction relies
/// on.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Authenticated user, when the client sent a token.
    pub user_id: Option<UserId>,
    /// Problems this connection subscribed to.
    pub subscriptions: Vec<ProblemId>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<VoteStreamEvent>,
    /// Milliseconds since the epoch of the last delivered heartbeat.
    last_heartbeat_ms: AtomicI64,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(
        user_id: Option<UserId>,
        subscriptions: Vec<ProblemId>,
        sender: mpsc::Sender<VoteStreamEvent>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ConnectionId::new(),
            user_id,
            subscriptions,
            connected_at: now,
            sender,
            last_heartbeat_ms: AtomicI64::new(now.timestamp_millis()),
            alive: AtomicBool::new(true),
        }
    }

    /// Push an event without waiting. Returns `false` when the buffer is full
    /// or the client went away.
    pub fn send(&self, event: VoteStreamEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(conn_id = %self.id, "Send buffer full");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.sender.is_closed()
    }

    /// Mark connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Record a delivered heartbeat.
    pub fn record_heartbeat(&self, at: DateTime<Utc>) {
        self.last_heartbeat_ms
            .store(at.timestamp_millis(), Ordering::SeqCst);
    }

    /// When the last heartbeat was delivered.
    pub fn last_heartbeat(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_heartbeat_ms.load(Ordering::SeqCst))
            .unwrap_or(self.connected_at)
    }

    /// Whether the last heartbeat is older than `stale_after` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        now - self.last_heartbeat() > stale_after
    }
}
