//! Route handlers.

pub mod health;
pub mod notification;
pub mod problem;
pub mod realtime;
pub mod vote;
