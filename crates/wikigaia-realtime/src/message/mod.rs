//! Stream events and subscription parsing.

pub mod types;
pub mod validator;

pub use types::VoteStreamEvent;
pub use validator::{ParsedProblemIds, parse_problem_ids};
