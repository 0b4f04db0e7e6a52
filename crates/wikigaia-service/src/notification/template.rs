//! Notification wording.

use serde_json::json;

use wikigaia_entity::notification::{CreateNotification, NotificationKind};
use wikigaia_entity::problem::Problem;
use wikigaia_core::types::UserId;

pub(super) fn milestone_reached(problem: &Problem, threshold: i64) -> CreateNotification {
    CreateNotification {
        recipient_id: problem.proposer_id,
        kind: NotificationKind::MilestoneReached,
        title: format!("Your problem reached {threshold} votes"),
        message: format!(
            "\"{}\" has been supported by {threshold} community members.",
            problem.title
        ),
        payload: json!({
            "problemId": problem.id,
            "problemTitle": problem.title,
            "threshold": threshold,
        }),
        problem_id: Some(problem.id),
    }
}

pub(super) fn admin_alert(problem: &Problem, threshold: i64, admin: UserId) -> CreateNotification {
    CreateNotification {
        recipient_id: admin,
        kind: NotificationKind::AdminMilestoneAlert,
        title: format!("Problem reached {threshold} votes"),
        message: format!(
            "\"{}\" reached the top milestone of {threshold} votes and is ready for review.",
            problem.title
        ),
        payload: json!({
            "problemId": problem.id,
            "problemTitle": problem.title,
            "proposerId": problem.proposer_id,
            "threshold": threshold,
        }),
        problem_id: Some(problem.id),
    }
}
