//! Review transitions: approve, reject, annotate.
//!
//! Handlers dispatch the returned event to the notifier only after the
//! engine has committed; a delivery problem never changes the HTTP outcome.

use api_types::transition::{ApproveRequest, RejectRequest, RemarkRequest, TransitionResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::users;

use crate::{ServerError, applications::map_status, server::ServerState};

pub async fn approve(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ApproveRequest>,
) -> Result<Json<TransitionResponse>, ServerError> {
    let event = state.engine.approve(&user, id, payload.amount_minor).await?;
    state.notifier.dispatch(&event).await;

    Ok(Json(TransitionResponse {
        id,
        status: map_status(event.application.status),
        message: "application approved".to_string(),
    }))
}

pub async fn reject(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<RejectRequest>,
) -> Result<Json<TransitionResponse>, ServerError> {
    let event = state.engine.reject(&user, id, &payload.remarks).await?;
    state.notifier.dispatch(&event).await;

    Ok(Json(TransitionResponse {
        id,
        status: map_status(event.application.status),
        message: "application rejected".to_string(),
    }))
}

/// Annotation only: no status change, no notification.
pub async fn remark(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<RemarkRequest>,
) -> Result<Json<TransitionResponse>, ServerError> {
    let application = state.engine.add_remark(&user, id, &payload.remarks).await?;

    Ok(Json(TransitionResponse {
        id,
        status: map_status(application.status),
        message: "remarks saved".to_string(),
    }))
}
