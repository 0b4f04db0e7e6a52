//! Heartbeat and stale-connection sweep timers.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::broadcaster::VoteBroadcaster;

/// Spawn the loop that pings every connection each `interval`.
pub fn spawn_heartbeat(
    broadcaster: Arc<VoteBroadcaster>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let delivered = broadcaster.ping_all(Utc::now());
                    tracing::trace!(delivered, "Heartbeat sent");
                }
                _ = shutdown.changed() => break,
            }
        }
        tracing::debug!("Heartbeat loop stopped");
    })
}

/// Spawn the loop that evicts stale connections each `interval`.
pub fn spawn_sweeper(
    broadcaster: Arc<VoteBroadcaster>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    broadcaster.sweep_stale(Utc::now());
                }
                _ = shutdown.changed() => break,
            }
        }
        tracing::debug!("Stale sweep loop stopped");
    })
}
