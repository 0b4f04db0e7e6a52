//! # wikigaia-service
//!
//! Business logic for the vote pipeline: the vote toggle, milestone
//! detection, notification dispatch, and workflow status updates, plus the
//! problem, notification-inbox, and maintenance services around them.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod context;
pub mod maintenance;
pub mod milestone;
pub mod notification;
pub mod problem;
pub mod user;
pub mod vote;
pub mod workflow;

pub use context::RequestContext;
pub use maintenance::{AuditReport, MaintenanceService};
pub use milestone::{MilestoneDetector, MilestoneReport, MilestoneService, detect};
pub use notification::{
    LogNotificationSink, NotificationDispatcher, NotificationOutcome, NotificationResult,
    NotificationService, NotificationSink,
};
pub use problem::{NewProblem, ProblemService};
pub use user::UserService;
pub use vote::{ToggleOutcome, VoteService, VoteStatus};
pub use workflow::{WorkflowOutcome, WorkflowStatusUpdater};
