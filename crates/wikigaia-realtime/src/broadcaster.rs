//! Vote broadcaster: connect, initial sync, fan-out, heartbeat and sweep.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use wikigaia_core::config::RealtimeConfig;
use wikigaia_core::types::{ProblemId, UserId};
use wikigaia_database::ProblemStore;

use crate::connection::{ConnectionHandle, ConnectionRegistry};
use crate::message::types::VoteStreamEvent;
use crate::message::validator::parse_problem_ids;
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::stream::ConnectionStream;

/// Point-in-time view of the broadcaster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcasterStats {
    /// Open connections.
    pub connections: usize,
    /// Problems with at least one subscriber.
    pub subscribed_problems: usize,
    /// Lifetime counters.
    pub metrics: MetricsSnapshot,
}

/// Fans vote-count changes out to subscribed streams.
pub struct VoteBroadcaster {
    registry: Arc<ConnectionRegistry>,
    problems: Arc<dyn ProblemStore>,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for VoteBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteBroadcaster")
            .field("connections", &self.registry.connection_count())
            .finish()
    }
}

impl VoteBroadcaster {
    /// Creates a broadcaster with its own registry.
    pub fn new(problems: Arc<dyn ProblemStore>, config: RealtimeConfig) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            problems,
            metrics: Arc::new(RealtimeMetrics::new()),
            config,
        }
    }

    /// The connection registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// The realtime configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Open a stream subscribed to the problems listed in `raw_problem_ids`.
    ///
    /// Malformed ids are reported in the `connected` event and otherwise
    /// ignored. The stream's buffer is pre-filled with `connected` and one
    /// `initial_vote_count` per known active problem before the connection
    /// becomes visible to broadcasts.
    pub async fn connect(&self, user_id: Option<UserId>, raw_problem_ids: &str) -> ConnectionStream {
        let parsed = parse_problem_ids(raw_problem_ids, self.config.max_subscriptions_per_connection);
        let capacity = self
            .config
            .channel_buffer_size
            .max(parsed.accepted.len() + 2);
        let (tx, rx) = mpsc::channel(capacity);
        let handle = Arc::new(ConnectionHandle::new(user_id, parsed.accepted.clone(), tx));

        if !parsed.rejected.is_empty() {
            debug!(
                conn_id = %handle.id,
                rejected = ?parsed.rejected,
                "Dropped malformed problem ids"
            );
        }

        let connected = handle.send(VoteStreamEvent::Connected {
            connection_id: handle.id,
            problem_ids: parsed.accepted.clone(),
            rejected_ids: parsed.rejected,
            timestamp: Utc::now(),
        });
        self.metrics.record_send(connected);

        if !parsed.accepted.is_empty() {
            match self.problems.vote_counts(&parsed.accepted).await {
                Ok(counts) => {
                    for (problem_id, vote_count) in counts {
                        let delivered = handle.send(VoteStreamEvent::InitialVoteCount {
                            problem_id,
                            vote_count,
                        });
                        self.metrics.record_send(delivered);
                    }
                }
                Err(e) => {
                    warn!(conn_id = %handle.id, error = %e, "Initial vote count sync failed");
                }
            }
        }

        self.registry.register(handle.clone());
        self.metrics.record_connect();
        info!(
            conn_id = %handle.id,
            user_id = ?handle.user_id,
            subscriptions = handle.subscriptions.len(),
            "Vote stream opened"
        );

        ConnectionStream::new(handle.id, rx, self.registry.clone(), self.metrics.clone())
    }

    /// Push a vote delta to every subscriber of `problem_id`.
    ///
    /// Returns the number of connections that accepted the event. A failed
    /// push evicts the connection.
    pub fn broadcast(
        &self,
        problem_id: ProblemId,
        vote_count: i64,
        has_voted: bool,
        user_id: Option<UserId>,
    ) -> usize {
        let event = VoteStreamEvent::VoteUpdate {
            problem_id,
            vote_count,
            has_voted,
            user_id,
            timestamp: Utc::now(),
        };

        let mut delivered = 0;
        for handle in self.registry.subscribers(&problem_id) {
            if handle.send(event.clone()) {
                self.metrics.record_send(true);
                delivered += 1;
            } else {
                self.metrics.record_send(false);
                self.evict(&handle, "push failed");
            }
        }

        debug!(problem_id = %problem_id, vote_count, delivered, "Vote update broadcast");
        delivered
    }

    /// Send a heartbeat to every connection. Returns how many were delivered.
    pub fn ping_all(&self, now: DateTime<Utc>) -> usize {
        let mut delivered = 0;
        for handle in self.registry.all() {
            if handle.send(VoteStreamEvent::Ping { timestamp: now }) {
                handle.record_heartbeat(now);
                delivered += 1;
            } else {
                self.metrics.record_send(false);
                self.evict(&handle, "heartbeat push failed");
            }
        }
        self.metrics.record_pings(delivered as u64);
        delivered
    }

    /// Evict every connection whose last heartbeat is older than the
    /// configured window at `now`. Returns the number evicted.
    pub fn sweep_stale(&self, now: DateTime<Utc>) -> usize {
        let stale_after = Duration::seconds(self.config.stale_after_seconds as i64);
        let mut evicted = 0;
        for handle in self.registry.all() {
            if !handle.is_alive() || handle.is_stale(now, stale_after) {
                self.evict(&handle, "stale heartbeat");
                evicted += 1;
            }
        }
        if evicted > 0 {
            info!(evicted, "Swept stale vote streams");
        }
        evicted
    }

    /// Close every connection.
    pub fn close_all(&self) {
        let handles = self.registry.clear();
        for handle in &handles {
            handle.mark_dead();
        }
        info!(count = handles.len(), "Closed all vote streams");
    }

    /// Current stats.
    pub fn stats(&self) -> BroadcasterStats {
        BroadcasterStats {
            connections: self.registry.connection_count(),
            subscribed_problems: self.registry.subscribed_problem_count(),
            metrics: self.metrics.snapshot(),
        }
    }

    fn evict(&self, handle: &ConnectionHandle, reason: &str) {
        handle.mark_dead();
        if self.registry.unregister(&handle.id).is_some() {
            self.metrics.record_eviction();
            debug!(conn_id = %handle.id, reason, "Evicted vote stream");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wikigaia_database::{MemoryStore, UserStore};
    use wikigaia_entity::problem::CreateProblem;
    use wikigaia_entity::user::UserRole;

    async fn setup() -> (VoteBroadcaster, ProblemId) {
        let store = MemoryStore::shared();
        let proposer = UserId::new();
        store
            .upsert(proposer, None, UserRole::User)
            .await
            .expect("upsert");
        let problem = store
            .create_with_creator_vote(&CreateProblem {
                title: "Urban heat islands".to_string(),
                description: "Map heat islands in dense neighborhoods".to_string(),
                category_id: None,
                proposer_id: proposer,
            })
            .await
            .expect("create");
        let broadcaster = VoteBroadcaster::new(store, RealtimeConfig::default());
        (broadcaster, problem.id)
    }

    #[tokio::test]
    async fn test_connect_sends_initial_sync_and_drops_malformed() {
        let (broadcaster, problem_id) = setup().await;
        let mut stream = broadcaster
            .connect(None, &format!("{problem_id},not-a-uuid"))
            .await;

        match stream.next().await {
            Some(VoteStreamEvent::Connected {
                problem_ids,
                rejected_ids,
                ..
            }) => {
                assert_eq!(problem_ids, vec![problem_id]);
                assert_eq!(rejected_ids, vec!["not-a-uuid".to_string()]);
            }
            other => panic!("expected connected, got {other:?}"),
        }
        assert_eq!(
            stream.next().await,
            Some(VoteStreamEvent::InitialVoteCount {
                problem_id,
                vote_count: 1,
            })
        );
        assert_eq!(broadcaster.stats().connections, 1);
    }

    #[tokio::test]
    async fn test_unknown_problem_gets_no_initial_count() {
        let (broadcaster, _) = setup().await;
        let unknown = ProblemId::new();
        let mut stream = broadcaster.connect(None, &unknown.to_string()).await;
        assert!(matches!(
            stream.next().await,
            Some(VoteStreamEvent::Connected { .. })
        ));
        assert_eq!(broadcaster.broadcast(unknown, 3, true, None), 1);
        assert!(matches!(
            stream.next().await,
            Some(VoteStreamEvent::VoteUpdate { vote_count: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_only_subscribers() {
        let (broadcaster, problem_id) = setup().await;
        let other = ProblemId::new();
        let _a = broadcaster.connect(None, &problem_id.to_string()).await;
        let _b = broadcaster.connect(None, &problem_id.to_string()).await;
        let _c = broadcaster.connect(None, &other.to_string()).await;

        let voter = UserId::new();
        assert_eq!(broadcaster.broadcast(problem_id, 2, true, Some(voter)), 2);
        assert!(broadcaster.stats().metrics.events_sent >= 2);
    }

    #[tokio::test]
    async fn test_dropped_stream_unregisters() {
        let (broadcaster, problem_id) = setup().await;
        let stream = broadcaster.connect(None, &problem_id.to_string()).await;
        assert_eq!(broadcaster.stats().connections, 1);
        drop(stream);
        assert_eq!(broadcaster.stats().connections, 0);
        assert_eq!(broadcaster.broadcast(problem_id, 2, true, None), 0);
        assert_eq!(broadcaster.stats().metrics.connections_closed, 1);
    }

    #[tokio::test]
    async fn test_sweep_evicts_after_stale_window() {
        let (broadcaster, problem_id) = setup().await;
        let mut stream = broadcaster.connect(None, &problem_id.to_string()).await;
        let base = Utc::now();
        let handle = broadcaster
            .registry()
            .get(&stream.id())
            .expect("registered");
        handle.record_heartbeat(base);
        drop(handle);

        assert_eq!(broadcaster.sweep_stale(base + Duration::seconds(59)), 0);
        assert_eq!(broadcaster.stats().connections, 1);

        assert_eq!(broadcaster.sweep_stale(base + Duration::seconds(61)), 1);
        assert_eq!(broadcaster.stats().connections, 0);
        assert_eq!(broadcaster.stats().metrics.evictions, 1);

        // Buffered events drain, then the stream ends.
        assert!(matches!(
            stream.next().await,
            Some(VoteStreamEvent::Connected { .. })
        ));
        assert!(matches!(
            stream.next().await,
            Some(VoteStreamEvent::InitialVoteCount { .. })
        ));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_ping_refreshes_heartbeat() {
        let (broadcaster, problem_id) = setup().await;
        let _stream = broadcaster.connect(None, &problem_id.to_string()).await;
        let base = Utc::now();
        assert_eq!(broadcaster.ping_all(base + Duration::seconds(30)), 1);
        assert_eq!(broadcaster.sweep_stale(base + Duration::seconds(85)), 0);
        assert_eq!(broadcaster.sweep_stale(base + Duration::seconds(91)), 1);
    }

    #[tokio::test]
    async fn test_full_buffer_evicts() {
        let store = MemoryStore::shared();
        let config = RealtimeConfig {
            channel_buffer_size: 1,
            ..RealtimeConfig::default()
        };
        let broadcaster = VoteBroadcaster::new(store, config);
        let problem_id = ProblemId::new();
        // Capacity is max(1, 1 + 2) = 3; `connected` already uses one slot.
        let _stream = broadcaster.connect(None, &problem_id.to_string()).await;
        assert_eq!(broadcaster.broadcast(problem_id, 1, true, None), 1);
        assert_eq!(broadcaster.broadcast(problem_id, 2, true, None), 1);
        assert_eq!(broadcaster.broadcast(problem_id, 3, true, None), 0);
        assert_eq!(broadcaster.stats().connections, 0);
        assert_eq!(broadcaster.stats().metrics.send_failures, 1);
    }

    #[tokio::test]
    async fn test_close_all_ends_streams() {
        let (broadcaster, problem_id) = setup().await;
        let mut stream = broadcaster.connect(None, &problem_id.to_string()).await;
        broadcaster.close_all();
        assert_eq!(broadcaster.stats().connections, 0);
        let mut remaining = 0;
        while stream.next().await.is_some() {
            remaining += 1;
        }
        assert_eq!(remaining, 2);
    }
}
