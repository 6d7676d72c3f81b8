//! In-app notification endpoints.

use api_types::notification::{NotificationListParams, NotificationListResponse, NotificationView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::users;

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<NotificationListParams>,
) -> Result<Json<NotificationListResponse>, ServerError> {
    let only_unread = params.unread.unwrap_or(false);
    let rows = state.engine.list_notifications(&user, only_unread).await?;

    let notifications = rows
        .into_iter()
        .map(|model| NotificationView {
            id: model.id,
            application_id: model.application_id,
            status: model.status,
            title: model.title,
            message: model.message,
            link: model.link,
            is_read: model.is_read,
            created_at: model.created_at,
        })
        .collect();

    Ok(Json(NotificationListResponse { notifications }))
}

pub async fn mark_read(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.mark_notification_read(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
