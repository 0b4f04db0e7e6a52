//! Periodic housekeeping.

pub mod service;

pub use service::{AuditReport, MaintenanceService};
