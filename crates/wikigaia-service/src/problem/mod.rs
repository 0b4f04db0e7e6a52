//! Problem proposal and lookup.

pub mod service;

pub use service::{NewProblem, ProblemService};
