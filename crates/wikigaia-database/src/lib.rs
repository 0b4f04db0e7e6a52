//! # wikigaia-database
//!
//! Store traits for every WikiGaia entity, their PostgreSQL implementations,
//! and an in-memory implementation that mirrors the schema's triggers and
//! constraints.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use store::{
    MilestoneClaim, MilestoneStore, NotificationStore, ProblemStore, Stores, UserStore,
    VoteCountDrift, VoteStore,
};
