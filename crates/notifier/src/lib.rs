//! Notification fan-out for committed application transitions.
//!
//! The [`Notifier`] takes an [`ApplicationEvent`] and delivers it over three
//! channels: an in-app notification row written synchronously through the
//! engine, a templated email, and an SMS to the applicant's normalized
//! number. Email and SMS go through an asynchronous queue with bounded
//! retry so gateway latency never blocks the caller.

use std::sync::Arc;

use engine::{ApplicationEvent, Engine, EventKind, Recipient, format_minor};
use tokio::sync::mpsc;

mod email;
mod links;
mod queue;
mod sms;

pub use email::{EmailMessage, HttpMailer, MailTransport, render};
pub use links::detail_link;
pub use sms::{SmsClient, normalize_phone};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("gateway error: {0}")]
    Gateway(String),
}

/// In-app notification title for an event.
fn title_for(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Approved => "Application Approved",
        EventKind::Rejected => "Application Rejected",
        EventKind::Resubmitted => "Application Resubmitted",
    }
}

/// In-app notification body. One or two short sentences; the detail view
/// carries the rest.
fn message_for(event: &ApplicationEvent) -> String {
    let app = &event.application;
    match event.kind {
        EventKind::Approved => {
            let amount = app
                .amount_minor
                .map(format_minor)
                .unwrap_or_else(|| "0.00".to_string());
            format!(
                "Your application #{} for {} has been approved. Amount released: PHP {amount}.",
                app.id, app.program
            )
        }
        EventKind::Rejected => {
            let reason = app.remarks.as_deref().unwrap_or("No reason recorded.");
            format!(
                "Your application #{} for {} has been rejected. Reason: {reason}",
                app.id, app.program
            )
        }
        EventKind::Resubmitted => format!(
            "Application #{} ({}) has been resubmitted and is pending review.",
            app.id,
            app.applicant_name()
        ),
    }
}

/// SMS text for one recipient. Kept under a single segment where possible.
fn sms_text(event: &ApplicationEvent) -> String {
    let app = &event.application;
    match event.kind {
        EventKind::Approved => {
            let amount = app
                .amount_minor
                .map(format_minor)
                .unwrap_or_else(|| "0.00".to_string());
            format!(
                "Assista: your application #{} is APPROVED. Amount: PHP {amount}. \
                 Check your email for the claiming requirements.",
                app.id
            )
        }
        EventKind::Rejected => format!(
            "Assista: your application #{} was REJECTED. \
             Check your email or dashboard for the reason.",
            app.id
        ),
        EventKind::Resubmitted => format!(
            "Assista: application #{} was resubmitted and is pending review.",
            app.id
        ),
    }
}

pub struct NotifierBuilder {
    engine: Arc<Engine>,
    base_url: String,
    mail: Option<Arc<dyn MailTransport>>,
    sms: Option<SmsClient>,
}

impl NotifierBuilder {
    pub fn mail(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.mail = Some(transport);
        self
    }

    pub fn sms(mut self, client: SmsClient) -> Self {
        self.sms = Some(client);
        self
    }

    /// Spawn the delivery worker and hand back the ready notifier. Must be
    /// called inside a tokio runtime.
    pub fn build(self) -> Notifier {
        let mail_enabled = self.mail.is_some();
        let sms_enabled = self.sms.is_some();
        let queue = (mail_enabled || sms_enabled).then(|| {
            queue::spawn_worker(queue::Channels {
                mail: self.mail,
                sms: self.sms,
            })
        });
        Notifier {
            engine: self.engine,
            base_url: self.base_url,
            queue,
            mail_enabled,
            sms_enabled,
        }
    }
}

pub struct Notifier {
    engine: Arc<Engine>,
    base_url: String,
    queue: Option<mpsc::Sender<queue::DeliveryTask>>,
    mail_enabled: bool,
    sms_enabled: bool,
}

impl Notifier {
    pub fn builder(engine: Arc<Engine>, base_url: impl Into<String>) -> NotifierBuilder {
        NotifierBuilder {
            engine,
            base_url: base_url.into(),
            mail: None,
            sms: None,
        }
    }

    /// Fan one committed transition out to every recipient.
    ///
    /// The in-app row is written synchronously so the recipient sees it on
    /// the next page load. Email and SMS are enqueued; a channel failure is
    /// retried by the worker and never surfaces here. A recipient failing
    /// one channel still receives the others.
    pub async fn dispatch(&self, event: &ApplicationEvent) {
        let title = title_for(event.kind);
        let message = message_for(event);

        for recipient in &event.recipients {
            let link = links::detail_link(&self.base_url, recipient.role, event.application.id);
            if let Err(err) = self
                .engine
                .notify(
                    recipient.user_id,
                    event.application.id,
                    event.kind,
                    title,
                    &message,
                    &link,
                )
                .await
            {
                tracing::error!(
                    "in-app notification for user {} failed: {err}",
                    recipient.user_id
                );
            }

            if self.mail_enabled {
                let rendered = email::render(event, recipient, &self.base_url);
                self.enqueue(queue::DeliveryTask::Email(rendered)).await;
            }

            if self.sms_enabled {
                self.enqueue_sms(event, recipient).await;
            }
        }
    }

    async fn enqueue_sms(&self, event: &ApplicationEvent, recipient: &Recipient) {
        let Some(raw) = recipient.contact_number.as_deref() else {
            return;
        };
        let Some(number) = sms::normalize_phone(raw) else {
            tracing::warn!(
                "user {} has no usable contact number, skipping sms",
                recipient.user_id
            );
            return;
        };
        self.enqueue(queue::DeliveryTask::Sms {
            recipient: number,
            message: sms_text(event),
        })
        .await;
    }

    async fn enqueue(&self, task: queue::DeliveryTask) {
        let Some(queue) = self.queue.as_ref() else {
            return;
        };
        if queue.send(task).await.is_err() {
            tracing::error!("delivery worker is gone, dropping outbound notification");
        }
    }
}
