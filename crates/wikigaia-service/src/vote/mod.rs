//! Vote toggle.

pub mod service;

pub use service::{ToggleOutcome, VoteService, VoteStatus};
