//! Broadcaster counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters maintained by the broadcaster.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    evictions: AtomicU64,
    events_sent: AtomicU64,
    send_failures: AtomicU64,
    pings_sent: AtomicU64,
}

impl RealtimeMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A stream was opened.
    pub fn record_connect(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// A client went away.
    pub fn record_disconnect(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// The server evicted a connection.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Account for one push attempt.
    pub fn record_send(&self, delivered: bool) {
        if delivered {
            self.events_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.send_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Account for delivered heartbeats.
    pub fn record_pings(&self, delivered: u64) {
        self.pings_sent.fetch_add(delivered, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            events_sent: self.events_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            pings_sent: self.pings_sent.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Streams opened since start.
    pub connections_opened: u64,
    /// Streams closed by clients.
    pub connections_closed: u64,
    /// Streams closed by the server (failed push or stale heartbeat).
    pub evictions: u64,
    /// Events delivered.
    pub events_sent: u64,
    /// Pushes that failed.
    pub send_failures: u64,
    /// Heartbeats delivered.
    pub pings_sent: u64,
}
