//! Email rendering and delivery.
//!
//! Rendering is pure: an event plus a recipient yields an [`EmailMessage`].
//! Delivery goes through [`MailTransport`] so tests can capture messages
//! instead of sending them.

use async_trait::async_trait;
use engine::{
    ApplicationEvent, EventKind, ProgramCategory, Recipient, format_minor,
};
use reqwest::Client;
use serde::Serialize;

use crate::{NotifyError, links};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Documents the applicant must bring to claim an approved release. The
/// list varies by program category.
fn claim_checklist(category: ProgramCategory) -> Vec<&'static str> {
    let mut items = vec!["One (1) valid government-issued ID"];
    match category {
        ProgramCategory::Medical => {
            items.push("Medical certificate or clinical abstract");
            items.push("Prescription or hospital statement of account");
        }
        ProgramCategory::Burial => {
            items.push("Registered death certificate");
            items.push("Funeral contract");
        }
        ProgramCategory::General => {
            items.push("Barangay indigency certificate");
        }
    }
    items
}

const OFFICE_BLOCK: &str = "Claiming is at the City Social Welfare and Development Office, \
City Hall Annex. Office hours: Mondays to Fridays, 8:00 AM to 5:00 PM.";

/// Render the status-update email for one recipient.
pub fn render(event: &ApplicationEvent, recipient: &Recipient, base_url: &str) -> EmailMessage {
    let app = &event.application;
    let status = app.status.display();
    let subject = format!("Assista: Application Status has been Updated to: {status}");
    let link = links::detail_link(base_url, recipient.role, app.id);

    let mut body = format!("Good day, {}!\n\n", recipient.first_name);
    match event.kind {
        EventKind::Approved => {
            let amount = app
                .amount_minor
                .map(format_minor)
                .unwrap_or_else(|| "0.00".to_string());
            body.push_str(&format!(
                "Your application #{} for {} has been APPROVED. \
                 Amount released: PHP {amount}.\n\n",
                app.id, app.program
            ));
            body.push_str("Please bring the following documents when claiming:\n");
            for item in claim_checklist(ProgramCategory::classify(&app.program)) {
                body.push_str(&format!("  - {item}\n"));
            }
            body.push('\n');
            body.push_str(OFFICE_BLOCK);
            body.push('\n');
        }
        EventKind::Rejected => {
            body.push_str(&format!(
                "Your application #{} for {} has been REJECTED.\n\n",
                app.id, app.program
            ));
            let reason = app.remarks.as_deref().unwrap_or("No reason recorded.");
            body.push_str(&format!("Reason: {reason}\n\n"));
            body.push_str(
                "You may correct the noted issues and resubmit the application \
                 from your dashboard.\n",
            );
        }
        EventKind::Resubmitted => {
            body.push_str(&format!(
                "Application #{} ({}) for {} has been resubmitted and returned \
                 to the pending queue for review.\n",
                app.id,
                app.applicant_name(),
                app.program
            ));
        }
    }
    body.push_str(&format!("\nView the application: {link}\n"));

    EmailMessage {
        to: recipient.email.clone(),
        subject,
        text: body,
    }
}

/// Delivery seam. Implementations must not panic on failure; they return
/// the error and the queue decides whether to retry.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct MailApiRequest<'a> {
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// HTTP mail-API transport: `POST {base_url}/messages` with a bearer key.
#[derive(Clone, Debug)]
pub struct HttpMailer {
    client: Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(client: Client, base_url: String, api_key: String, from: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("x-mail-from", &self.from)
            .json(&MailApiRequest {
                to: &message.to,
                subject: &message.subject,
                text: &message.text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Gateway(format!(
                "mail API answered {status}"
            )));
        }
        Ok(())
    }
}
