//! Route definitions for the WikiGaia HTTP API.

use axum::Router;
use axum::routing::{get, post, put};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route, without middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(problem_routes())
        .merge(notification_routes())
        .merge(realtime_routes())
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Problems, votes, and milestone records.
fn problem_routes() -> Router<AppState> {
    Router::new()
        .route("/problems", post(handlers::problem::create_problem))
        .route("/problems/{id}", get(handlers::problem::get_problem))
        .route(
            "/problems/{id}/milestones",
            get(handlers::problem::list_milestones),
        )
        .route(
            "/problems/{id}/vote",
            get(handlers::vote::get_vote).post(handlers::vote::toggle_vote),
        )
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/vote-milestone",
            post(handlers::notification::vote_milestone),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
}

fn realtime_routes() -> Router<AppState> {
    Router::new().route(
        "/realtime/votes",
        get(handlers::realtime::vote_stream).post(handlers::realtime::broadcast_vote),
    )
}
