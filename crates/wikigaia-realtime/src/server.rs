//! Realtime engine: owns the broadcaster and its timers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::info;

use wikigaia_core::config::RealtimeConfig;
use wikigaia_database::ProblemStore;

use crate::broadcaster::VoteBroadcaster;
use crate::connection::heartbeat::{spawn_heartbeat, spawn_sweeper};

/// Owns the vote broadcaster and its recurring timers.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// The broadcaster shared with handlers and task handlers.
    pub broadcaster: Arc<VoteBroadcaster>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("broadcaster", &self.broadcaster)
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates the engine. Timers start with [`RealtimeEngine::start`].
    pub fn new(problems: Arc<dyn ProblemStore>, config: RealtimeConfig) -> Self {
        info!(
            ping_interval_seconds = config.ping_interval_seconds,
            stale_after_seconds = config.stale_after_seconds,
            "Realtime engine initialized"
        );
        Self {
            broadcaster: Arc::new(VoteBroadcaster::new(problems, config)),
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start the heartbeat and sweep timers; they stop when `shutdown`
    /// flips.
    pub async fn start(&self, shutdown: watch::Receiver<bool>) {
        let config = self.broadcaster.config();
        let ping = Duration::from_secs(config.ping_interval_seconds.max(1));
        let sweep = Duration::from_secs(config.sweep_interval_seconds.max(1));

        let mut tasks = self.tasks.lock().await;
        tasks.push(spawn_heartbeat(
            self.broadcaster.clone(),
            ping,
            shutdown.clone(),
        ));
        tasks.push(spawn_sweeper(self.broadcaster.clone(), sweep, shutdown));
    }

    /// Wait for the timers to stop and close every connection.
    pub async fn shutdown(&self) {
        info!("Shutting down realtime engine");
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Realtime timer task failed");
            }
        }
        self.broadcaster.close_all();
        info!("Realtime engine shut down");
    }
}
