//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use wikigaia_auth::JwtDecoder;
use wikigaia_core::config::AppConfig;
use wikigaia_database::Stores;
use wikigaia_realtime::RealtimeEngine;
use wikigaia_service::{MilestoneService, NotificationService, ProblemService, VoteService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Store backend.
    pub stores: Stores,
    /// Identity token verification.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Problem creation and lookup.
    pub problem_service: Arc<ProblemService>,
    /// Vote toggle and status.
    pub vote_service: Arc<VoteService>,
    /// Milestone detection and dispatch.
    pub milestone_service: Arc<MilestoneService>,
    /// Notification inbox.
    pub notification_service: Arc<NotificationService>,
    /// Vote streams.
    pub realtime: RealtimeEngine,
    /// Process start, for uptime.
    pub started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("stores", &self.stores)
            .field("realtime", &self.realtime)
            .finish()
    }
}
