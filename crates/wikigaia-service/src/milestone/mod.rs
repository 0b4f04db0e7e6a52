//! Milestone detection and processing.

pub mod detector;
pub mod service;

pub use detector::{MilestoneDetector, detect};
pub use service::{MilestoneReport, MilestoneService};
