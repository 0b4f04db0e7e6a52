//! Vote domain entities.

pub mod kind;
pub mod model;

pub use kind::VoteType;
pub use model::Vote;
