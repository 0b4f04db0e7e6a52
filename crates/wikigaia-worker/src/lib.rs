//! Background task processing for WikiGaia.
//!
//! This crate provides:
//! - A bounded in-process task queue that doubles as the [`EventPublisher`]
//!   the vote service publishes to
//! - A task executor that fans each task out to every handler accepting it
//! - A worker runner that drains the queue with bounded concurrency
//! - A cron scheduler that enqueues periodic maintenance tasks
//! - Handlers for milestones, workflow status, realtime broadcast, and
//!   maintenance
//!
//! [`EventPublisher`]: wikigaia_core::traits::EventPublisher

pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use executor::{ExecutionReport, TaskExecutionError, TaskExecutor, TaskHandler};
pub use queue::{Task, TaskKind, TaskQueue};
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
