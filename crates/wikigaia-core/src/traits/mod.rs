//! Core traits defined in `wikigaia-core` and implemented by other crates.

pub mod publisher;

pub use publisher::{EventPublisher, NoopPublisher};
