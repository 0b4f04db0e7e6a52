//! Task handlers.

pub mod broadcast;
pub mod maintenance;
pub mod milestone;
pub mod workflow;

pub use broadcast::BroadcastTaskHandler;
pub use maintenance::MaintenanceTaskHandler;
pub use milestone::MilestoneTaskHandler;
pub use workflow::WorkflowTaskHandler;
