//! Problem handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use wikigaia_core::types::ProblemId;
use wikigaia_service::NewProblem;

use crate::dto::request::CreateProblemRequest;
use crate::dto::response::{MilestoneResponse, ProblemResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// POST /problems
pub async fn create_problem(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateProblemRequest>,
) -> Result<(StatusCode, Json<ProblemResponse>), ApiError> {
    let problem = state
        .problem_service
        .create(
            &auth,
            NewProblem {
                title: req.title,
                description: req.description,
                category_id: req.category_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(problem.into())))
}

/// GET /problems/{id}
pub async fn get_problem(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProblemResponse>, ApiError> {
    let id: ProblemId = parse_id(&id)?;
    let problem = state.problem_service.get(id).await?;
    Ok(Json(problem.into()))
}

/// GET /problems/{id}/milestones
pub async fn list_milestones(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MilestoneResponse>>, ApiError> {
    let id: ProblemId = parse_id(&id)?;
    state.problem_service.get(id).await?;
    let records = state.milestone_service.list(id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
