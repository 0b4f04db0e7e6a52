//! Lifecycle status advancement.

pub mod updater;

pub use updater::{WorkflowOutcome, WorkflowStatusUpdater};
