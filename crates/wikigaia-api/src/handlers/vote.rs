//! Vote handlers.

use axum::Json;
use axum::extract::{Path, State};

use wikigaia_core::types::ProblemId;
use wikigaia_service::VoteStatus;

use crate::dto::response::VoteToggleResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_id};
use crate::state::AppState;

/// GET /problems/{id}/vote
pub async fn get_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<VoteStatus>, ApiError> {
    let id: ProblemId = parse_id(&id)?;
    Ok(Json(state.vote_service.status(&auth, id).await?))
}

/// POST /problems/{id}/vote
///
/// Toggles the caller's community vote. Milestones, workflow, and realtime
/// fan-out run afterwards on the worker.
pub async fn toggle_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<VoteToggleResponse>, ApiError> {
    let id: ProblemId = parse_id(&id)?;
    let outcome = state.vote_service.toggle(&auth, id).await?;
    Ok(Json(outcome.into()))
}
