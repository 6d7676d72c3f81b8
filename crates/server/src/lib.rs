use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod applications;
mod notifications;
mod programs;
mod reports;
mod server;
mod settings;
mod transitions;

pub mod types {
    pub mod application {
        pub use api_types::application::{
            ApplicationCreated, ApplicationDetailResponse, ApplicationListParams,
            ApplicationListResponse, ApplicationNew, ApplicationResubmit, ApplicationView,
            AttachmentNew, AttachmentView, PageInfo,
        };
    }

    pub mod program {
        pub use api_types::program::{ProgramPut, ProgramView, ProgramsResponse};
    }

    pub mod transition {
        pub use api_types::transition::{
            ApproveRequest, RejectRequest, RemarkRequest, TransitionResponse,
        };
    }

    pub mod report {
        pub use api_types::report::{
            ReportParams, ReportResponse, ReportRowView, SignatoriesView, StatusTotalsView,
        };
    }

    pub mod notification {
        pub use api_types::notification::{
            NotificationListParams, NotificationListResponse, NotificationView,
        };
    }

    pub mod settings {
        pub use api_types::settings::{SettingPut, SettingView, SettingsResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    Internal(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::StateConflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
