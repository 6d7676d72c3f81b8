//! Admin settings endpoints.

use api_types::settings::{SettingPut, SettingView, SettingsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::users;

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SettingsResponse>, ServerError> {
    let rows = state.engine.list_settings(&user).await?;

    let settings = rows
        .into_iter()
        .map(|model| SettingView {
            key: model.key,
            value: model.value,
            label: model.label,
            kind: model.kind,
        })
        .collect();

    Ok(Json(SettingsResponse { settings }))
}

pub async fn put(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Json(payload): Json<SettingPut>,
) -> Result<StatusCode, ServerError> {
    state.engine.put_setting(&user, &key, &payload.value).await?;
    Ok(StatusCode::NO_CONTENT)
}
