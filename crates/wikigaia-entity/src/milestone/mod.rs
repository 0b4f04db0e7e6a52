//! Milestone domain entities.

pub mod model;

pub use model::MilestoneRecord;
