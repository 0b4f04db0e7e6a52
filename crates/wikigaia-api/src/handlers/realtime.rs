//! Vote stream handlers.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};

use wikigaia_realtime::VoteStreamEvent;

use crate::dto::request::{BroadcastVoteRequest, VoteStreamQuery};
use crate::dto::response::BroadcastResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, MaybeAuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /realtime/votes?problemIds=id1,id2
///
/// Server-sent events: `connected`, one `initial_vote_count` per known
/// problem, then `vote_update` and `ping`. Authentication is optional.
pub async fn vote_stream(
    State(state): State<AppState>,
    MaybeAuthUser(ctx): MaybeAuthUser,
    Query(query): Query<VoteStreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let user_id = ctx.map(|c| c.user_id);
    let stream = state
        .realtime
        .broadcaster
        .connect(user_id, &query.problem_ids)
        .await;

    let events = stream.filter_map(|event| async move { to_sse_event(&event).map(Ok) });
    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

fn to_sse_event(event: &VoteStreamEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::error!(error = %e, event = event.name(), "Failed to encode stream event");
            None
        }
    }
}

/// POST /realtime/votes (admin)
pub async fn broadcast_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BroadcastVoteRequest>,
) -> Result<Json<BroadcastResponse>, ApiError> {
    auth.require_admin()?;
    let broadcast_to = state.realtime.broadcaster.broadcast(
        req.problem_id,
        req.new_vote_count,
        req.has_voted,
        req.user_id,
    );
    Ok(Json(BroadcastResponse {
        success: true,
        broadcast_to,
    }))
}
