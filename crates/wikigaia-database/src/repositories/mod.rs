//! PostgreSQL implementations of the store traits.

pub mod milestone;
pub mod notification;
pub mod problem;
pub mod user;
pub mod vote;

pub use milestone::MilestoneRepository;
pub use notification::NotificationRepository;
pub use problem::ProblemRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;

/// Raised by the `votes_no_self_vote` trigger.
pub const SELF_VOTE_CONSTRAINT: &str = "votes_no_self_vote";
/// Unique key on `(user_id, problem_id, vote_type)`.
pub const DUPLICATE_VOTE_CONSTRAINT: &str = "votes_user_problem_type_key";
/// Unique key on `(problem_id, threshold)`.
pub const MILESTONE_CONSTRAINT: &str = "milestones_problem_threshold_key";

/// Message returned for a rejected self-vote.
pub const SELF_VOTE_MESSAGE: &str = "You cannot vote on your own problem";
/// Message returned for a duplicate vote.
pub const DUPLICATE_VOTE_MESSAGE: &str = "You have already voted on this problem";
