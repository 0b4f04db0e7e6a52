//! Tables held by the in-memory store.

use std::collections::{BTreeMap, HashMap};

use wikigaia_core::types::{ProblemId, UserId};
use wikigaia_entity::milestone::MilestoneRecord;
use wikigaia_entity::notification::Notification;
use wikigaia_entity::problem::Problem;
use wikigaia_entity::user::User;
use wikigaia_entity::vote::{Vote, VoteType};

#[derive(Debug, Default)]
pub(super) struct MemoryState {
    pub(super) users: HashMap<UserId, User>,
    pub(super) problems: HashMap<ProblemId, Problem>,
    /// Keyed like `votes_user_problem_type_key`.
    pub(super) votes: HashMap<(UserId, ProblemId, VoteType), Vote>,
    /// Keyed like `milestones_problem_threshold_key`.
    pub(super) milestones: BTreeMap<(ProblemId, i64), MilestoneRecord>,
    pub(super) notifications: Vec<Notification>,
}
