//! # wikigaia-realtime
//!
//! Process-local registry of long-lived vote streams. Clients subscribe to a
//! set of problems, receive the current counts on connect, then a delta on
//! every vote mutation and a heartbeat every ping interval. A periodic sweep
//! evicts connections whose last heartbeat is too old.
//!
//! This crate is transport-agnostic: streams yield [`VoteStreamEvent`]s and
//! the HTTP layer frames them as server-sent events.

pub mod broadcaster;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod server;
pub mod stream;

pub use broadcaster::{BroadcasterStats, VoteBroadcaster};
pub use message::types::VoteStreamEvent;
pub use server::RealtimeEngine;
pub use stream::ConnectionStream;
