//! Application listing, detail, intake and resubmission endpoints.

use api_types::application::{
    ApplicationCreated, ApplicationDetailResponse, ApplicationListParams,
    ApplicationListResponse, ApplicationNew, ApplicationResubmit, ApplicationView,
    AttachmentView, PageInfo,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use engine::{
    Application, ApplicationListFilter, ApplicationSort, ApplicationUpdate, AttachmentSlot,
    NewApplication, NewAttachment, SortDirection, SortKey, users,
};

use crate::{ServerError, server::ServerState};

const DEFAULT_PER_PAGE: u64 = 50;

pub(crate) fn map_status(status: engine::ApplicationStatus) -> api_types::ApplicationStatus {
    match status {
        engine::ApplicationStatus::Pending => api_types::ApplicationStatus::Pending,
        engine::ApplicationStatus::Approved => api_types::ApplicationStatus::Approved,
        engine::ApplicationStatus::Rejected => api_types::ApplicationStatus::Rejected,
    }
}

pub(crate) fn map_status_in(status: api_types::ApplicationStatus) -> engine::ApplicationStatus {
    match status {
        api_types::ApplicationStatus::Pending => engine::ApplicationStatus::Pending,
        api_types::ApplicationStatus::Approved => engine::ApplicationStatus::Approved,
        api_types::ApplicationStatus::Rejected => engine::ApplicationStatus::Rejected,
    }
}

pub(crate) fn view(app: &Application) -> ApplicationView {
    ApplicationView {
        id: app.id,
        applicant_name: app.applicant_name(),
        contact_number: app.contact_number.clone(),
        email: app.email.clone(),
        barangay: app.barangay.clone(),
        city: app.city.clone(),
        program: app.program.clone(),
        assistance_type: app.assistance_type.clone(),
        date_of_incident: app.date_of_incident,
        status: map_status(app.status),
        amount_minor: app.amount_minor,
        approved_date: app.approved_date,
        remarks: app.remarks.clone(),
        submitted_at: app.submitted_at,
    }
}

fn parse_sort(
    sort_by: Option<&str>,
    sort_direction: Option<&str>,
) -> Result<Option<ApplicationSort>, ServerError> {
    let key = match sort_by {
        None => return Ok(None),
        Some("submitted_at") => SortKey::SubmittedAt,
        Some("last_name") => SortKey::LastName,
        Some("status") => SortKey::Status,
        Some("program") => SortKey::Program,
        Some(other) => {
            return Err(ServerError::Generic(format!("unknown sort key: {other}")));
        }
    };
    let direction = match sort_direction {
        None | Some("desc") => SortDirection::Desc,
        Some("asc") => SortDirection::Asc,
        Some(other) => {
            return Err(ServerError::Generic(format!(
                "unknown sort direction: {other}"
            )));
        }
    };
    Ok(Some(ApplicationSort { key, direction }))
}

fn filter_from_params(params: &ApplicationListParams) -> Result<ApplicationListFilter, ServerError> {
    Ok(ApplicationListFilter {
        search: params.search.clone(),
        status: params.status.map(map_status_in),
        program: params.program.clone(),
        barangay: params.barangay.clone(),
        submitted_from: params.start_date,
        submitted_to: params.end_date,
        sort: parse_sort(params.sort_by.as_deref(), params.sort_direction.as_deref())?,
    })
}

fn page_response(page: engine::ApplicationPage) -> ApplicationListResponse {
    ApplicationListResponse {
        applications: page.items.iter().map(view).collect(),
        page_info: PageInfo {
            page: page.page_info.page,
            per_page: page.page_info.per_page,
            total_items: page.page_info.total_items,
            total_pages: page.page_info.total_pages,
        },
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<ApplicationListParams>,
) -> Result<Json<ApplicationListResponse>, ServerError> {
    let filter = filter_from_params(&params)?;
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);

    let result = state
        .engine
        .list_applications(&user, &filter, page, per_page)
        .await?;
    Ok(Json(page_response(result)))
}

/// The staff triage queue: pending applications, oldest first.
pub async fn pending_queue(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(params): Query<ApplicationListParams>,
) -> Result<Json<ApplicationListResponse>, ServerError> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);

    let result = state
        .engine
        .pending_queue(&user, params.search.clone(), page, per_page)
        .await?;
    Ok(Json(page_response(result)))
}

pub async fn detail(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApplicationDetailResponse>, ServerError> {
    let detail = state.engine.application_detail(&user, id).await?;

    let attachments = detail
        .attachments
        .iter()
        .map(|model| AttachmentView {
            slot: model.slot.clone(),
            position: model.position,
            path: model.path.clone(),
        })
        .collect();

    Ok(Json(ApplicationDetailResponse {
        application: view(&detail.application),
        attachments,
    }))
}

pub async fn submit(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ApplicationNew>,
) -> Result<Json<ApplicationCreated>, ServerError> {
    let mut attachments = Vec::with_capacity(payload.attachments.len());
    for attachment in &payload.attachments {
        attachments.push(NewAttachment {
            slot: AttachmentSlot::try_from(attachment.slot.as_str())?,
            path: attachment.path.clone(),
        });
    }

    let new = NewApplication {
        first_name: payload.first_name,
        middle_name: payload.middle_name,
        last_name: payload.last_name,
        contact_number: payload.contact_number,
        email: payload.email,
        house_no: payload.house_no,
        barangay: payload.barangay,
        city: payload.city,
        birth_date: payload.birth_date,
        sex: payload.sex,
        civil_status: payload.civil_status,
        program: payload.program,
        assistance_type: payload.assistance_type,
        date_of_incident: payload.date_of_incident,
        attachments,
    };

    let application = state.engine.submit_application(&user, new).await?;
    Ok(Json(ApplicationCreated { id: application.id }))
}

pub async fn resubmit(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ApplicationResubmit>,
) -> Result<Json<ApplicationView>, ServerError> {
    let update = ApplicationUpdate {
        contact_number: payload.contact_number,
        email: payload.email,
        house_no: payload.house_no,
        barangay: payload.barangay,
        city: payload.city,
        assistance_type: payload.assistance_type,
        date_of_incident: payload.date_of_incident,
    };

    let event = state.engine.resubmit(&user, id, update).await?;
    state.notifier.dispatch(&event).await;
    Ok(Json(view(&event.application)))
}
