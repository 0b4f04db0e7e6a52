//! Milestone notifications and the notification inbox.

pub mod dispatcher;
pub mod service;
pub mod sink;
mod template;

pub use dispatcher::{NotificationDispatcher, NotificationOutcome, NotificationResult};
pub use service::NotificationService;
pub use sink::{LogNotificationSink, NotificationSink};
