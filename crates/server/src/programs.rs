//! Program catalogue endpoints.

use api_types::program::{ProgramPut, ProgramView, ProgramsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::{ProgramUpsert, users};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<ProgramsResponse>, ServerError> {
    let rows = state.engine.list_programs().await?;

    let programs = rows
        .into_iter()
        .map(|model| ProgramView {
            requirements: model.requirement_list(),
            title: model.title,
            description: model.description,
            default_amount_minor: model.default_amount_minor,
        })
        .collect();

    Ok(Json(ProgramsResponse { programs }))
}

pub async fn put(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(title): Path<String>,
    Json(payload): Json<ProgramPut>,
) -> Result<Json<ProgramView>, ServerError> {
    let model = state
        .engine
        .upsert_program(
            &user,
            ProgramUpsert {
                title,
                description: payload.description,
                requirements: payload.requirements,
                default_amount_minor: payload.default_amount_minor,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(ProgramView {
        requirements: model.requirement_list(),
        title: model.title,
        description: model.description,
        default_amount_minor: model.default_amount_minor,
    }))
}
