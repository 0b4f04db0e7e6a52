//! # wikigaia-entity
//!
//! Domain entity models for WikiGaia. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.

pub mod milestone;
pub mod notification;
pub mod problem;
pub mod user;
pub mod vote;
