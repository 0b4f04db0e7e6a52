//! Problem domain entities.

pub mod model;
pub mod moderation;
pub mod status;

pub use model::{CreateProblem, Problem};
pub use moderation::ModerationStatus;
pub use status::ProblemStatus;
