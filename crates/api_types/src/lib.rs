use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Case status as exposed over the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

pub mod application {
    use super::*;

    /// Query parameters for the role-scoped list.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ApplicationListParams {
        pub search: Option<String>,
        pub status: Option<ApplicationStatus>,
        pub program: Option<String>,
        pub barangay: Option<String>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub sort_by: Option<String>,
        pub sort_direction: Option<String>,
        pub page: Option<u64>,
        pub per_page: Option<u64>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ApplicationView {
        pub id: i32,
        pub applicant_name: String,
        pub contact_number: String,
        pub email: String,
        pub barangay: String,
        pub city: String,
        pub program: String,
        pub assistance_type: String,
        pub date_of_incident: NaiveDate,
        pub status: ApplicationStatus,
        pub amount_minor: Option<i64>,
        pub approved_date: Option<NaiveDate>,
        pub remarks: Option<String>,
        pub submitted_at: DateTime<Utc>,
    }

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct PageInfo {
        pub page: u64,
        pub per_page: u64,
        pub total_items: u64,
        pub total_pages: u64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ApplicationListResponse {
        pub applications: Vec<ApplicationView>,
        pub page_info: PageInfo,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AttachmentView {
        /// valid_id | indigency_cert | additional
        pub slot: String,
        pub position: i32,
        pub path: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ApplicationDetailResponse {
        pub application: ApplicationView,
        pub attachments: Vec<AttachmentView>,
    }

    /// Submission payload.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ApplicationNew {
        pub first_name: String,
        pub middle_name: Option<String>,
        pub last_name: String,
        pub contact_number: String,
        pub email: String,
        pub house_no: String,
        pub barangay: String,
        pub city: String,
        pub birth_date: NaiveDate,
        pub sex: String,
        pub civil_status: String,
        pub program: String,
        pub assistance_type: String,
        pub date_of_incident: NaiveDate,
        #[serde(default)]
        pub attachments: Vec<AttachmentNew>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AttachmentNew {
        pub slot: String,
        pub path: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ApplicationCreated {
        pub id: i32,
    }

    /// Editable fields on resubmission.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ApplicationResubmit {
        pub contact_number: Option<String>,
        pub email: Option<String>,
        pub house_no: Option<String>,
        pub barangay: Option<String>,
        pub city: Option<String>,
        pub assistance_type: Option<String>,
        pub date_of_incident: Option<NaiveDate>,
    }
}

pub mod program {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ProgramView {
        pub title: String,
        pub description: String,
        pub requirements: Vec<String>,
        pub default_amount_minor: Option<i64>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ProgramsResponse {
        pub programs: Vec<ProgramView>,
    }

    /// Admin payload for the catalogue form; the title comes from the path.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ProgramPut {
        pub description: String,
        #[serde(default)]
        pub requirements: Vec<String>,
        pub default_amount_minor: Option<i64>,
        pub is_active: bool,
    }
}

pub mod transition {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ApproveRequest {
        /// Released amount in centavos; must be > 0.
        pub amount_minor: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct RejectRequest {
        pub remarks: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct RemarkRequest {
        pub remarks: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransitionResponse {
        pub id: i32,
        pub status: ApplicationStatus,
        pub message: String,
    }
}

pub mod report {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ReportParams {
        pub status: Option<ApplicationStatus>,
        pub program: Option<String>,
        pub barangay: Option<String>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ReportRowView {
        pub id: i32,
        pub applicant_name: String,
        pub program: String,
        pub status: ApplicationStatus,
        pub amount_minor: Option<i64>,
        pub submitted_date: NaiveDate,
        pub approved_date: Option<NaiveDate>,
        pub contact_number: String,
        pub barangay: String,
    }

    #[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
    pub struct StatusTotalsView {
        pub total: u64,
        pub pending: u64,
        pub approved: u64,
        pub rejected: u64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SignatoriesView {
        pub mayor: String,
        pub cswdo_head: String,
        pub social_worker: String,
    }

    /// Both totals are exposed; the document renderer picks one.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ReportResponse {
        pub rows: Vec<ReportRowView>,
        pub filtered_totals: StatusTotalsView,
        pub global_totals: StatusTotalsView,
        pub signatories: SignatoriesView,
    }
}

pub mod notification {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
    pub struct NotificationListParams {
        /// When true, only unread notifications are returned.
        pub unread: Option<bool>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct NotificationView {
        pub id: i32,
        pub application_id: i32,
        pub status: String,
        pub title: String,
        pub message: String,
        pub link: String,
        pub is_read: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct NotificationListResponse {
        pub notifications: Vec<NotificationView>,
    }
}

pub mod settings {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SettingView {
        pub key: String,
        pub value: String,
        pub label: String,
        pub kind: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SettingsResponse {
        pub settings: Vec<SettingView>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SettingPut {
        pub value: String,
    }
}
