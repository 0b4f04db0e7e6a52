//! # wikigaia-core
//!
//! Core crate for WikiGaia. Contains configuration schemas, typed
//! identifiers, domain events, pagination types, the event publishing
//! trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other WikiGaia crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
