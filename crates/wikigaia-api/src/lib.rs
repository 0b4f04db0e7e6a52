//! # wikigaia-api
//!
//! HTTP API layer for WikiGaia built on Axum.
//!
//! Provides the REST endpoints, the server-sent vote stream, middleware
//! (request logging, CORS), extractors, DTOs, error mapping, and the
//! application wiring that starts the worker and realtime timers.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{AppComponents, build_app, build_components, run_server};
pub use error::ApiError;
pub use state::AppState;
