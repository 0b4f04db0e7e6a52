//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use wikigaia_core::types::{NotificationId, PageRequest, PageResponse};
use wikigaia_service::MilestoneReport;

use crate::dto::request::VoteMilestoneRequest;
use crate::dto::response::{NotificationResponse, SuccessResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// POST /notifications/vote-milestone (admin)
///
/// Runs milestone detection and dispatch for an explicit count change.
/// Thresholds already notified are reported, never re-sent.
pub async fn vote_milestone(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<VoteMilestoneRequest>,
) -> Result<Json<MilestoneReport>, ApiError> {
    auth.require_admin()?;
    let report = state
        .milestone_service
        .process(req.problem_id, req.old_vote_count, req.new_vote_count)
        .await;
    Ok(Json(report))
}

/// GET /notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<NotificationResponse>>, ApiError> {
    let result = state.notification_service.list(&auth, &page).await?;
    Ok(Json(PageResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        page: result.page,
        page_size: result.page_size,
        total_items: result.total_items,
        total_pages: result.total_pages,
        has_next: result.has_next,
    }))
}

/// PUT /notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id: NotificationId = parse_id(&id)?;
    state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
