//! Role-scoped deep links.
//!
//! A notification link must land on the detail view the recipient is
//! actually allowed to open, so the path depends on the recipient's role.

use engine::Role;

pub fn detail_link(base_url: &str, role: Role, application_id: i32) -> String {
    let base = base_url.trim_end_matches('/');
    match role {
        Role::Staff => format!("{base}/staff/applications/{application_id}"),
        Role::Admin => format!("{base}/admin/applications/{application_id}"),
        Role::Applicant => format!("{base}/applications/{application_id}"),
    }
}
