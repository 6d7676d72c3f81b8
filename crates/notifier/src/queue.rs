//! Asynchronous delivery queue.
//!
//! Email and SMS latency must not block the HTTP response that triggered a
//! transition, so outbound deliveries are queued and worked off by a
//! background task. Each delivery is attempted a bounded number of times
//! and then dead-lettered to the log; one channel failing never affects
//! another.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::email::{EmailMessage, MailTransport};
use crate::sms::SmsClient;
use crate::NotifyError;

pub(crate) const MAX_ATTEMPTS: u32 = 3;
const QUEUE_DEPTH: usize = 64;

#[derive(Clone, Debug)]
pub(crate) enum DeliveryTask {
    Email(EmailMessage),
    Sms { recipient: String, message: String },
}

impl DeliveryTask {
    fn describe(&self) -> String {
        match self {
            Self::Email(message) => format!("email to {}", message.to),
            Self::Sms { recipient, .. } => format!("sms to {recipient}"),
        }
    }
}

#[derive(Clone)]
pub(crate) struct Channels {
    pub(crate) mail: Option<Arc<dyn MailTransport>>,
    pub(crate) sms: Option<SmsClient>,
}

async fn deliver_once(channels: &Channels, task: &DeliveryTask) -> Result<(), NotifyError> {
    match task {
        DeliveryTask::Email(message) => match channels.mail.as_ref() {
            Some(mail) => mail.send(message).await,
            None => Ok(()),
        },
        DeliveryTask::Sms { recipient, message } => match channels.sms.as_ref() {
            Some(sms) => sms.try_send(recipient, message).await,
            None => Ok(()),
        },
    }
}

/// Attempt a delivery up to `max_attempts` times with a linear backoff,
/// then give up and dead-letter to the log.
pub(crate) async fn deliver_with_retry(
    channels: &Channels,
    task: DeliveryTask,
    max_attempts: u32,
) {
    for attempt in 1..=max_attempts {
        match deliver_once(channels, &task).await {
            Ok(()) => return,
            Err(err) if attempt < max_attempts => {
                tracing::warn!(
                    "{} failed on attempt {attempt}: {err}; retrying",
                    task.describe()
                );
                tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
            }
            Err(err) => {
                tracing::error!(
                    "{} permanently failed after {max_attempts} attempts: {err}",
                    task.describe()
                );
            }
        }
    }
}

/// Spawn the delivery worker and hand back its queue.
pub(crate) fn spawn_worker(channels: Channels) -> mpsc::Sender<DeliveryTask> {
    let (tx, mut rx) = mpsc::channel::<DeliveryTask>(QUEUE_DEPTH);
    tokio::spawn(async move {
        while let Some(task) = rx.recv().await {
            deliver_with_retry(&channels, task, MAX_ATTEMPTS).await;
        }
    });
    tx
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct FailingMail {
        attempts: AtomicU32,
    }

    #[async_trait]
    impl MailTransport for FailingMail {
        async fn send(&self, _message: &EmailMessage) -> Result<(), NotifyError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(NotifyError::Gateway("boom".to_string()))
        }
    }

    struct FlakyMail {
        attempts: AtomicU32,
    }

    #[async_trait]
    impl MailTransport for FlakyMail {
        async fn send(&self, _message: &EmailMessage) -> Result<(), NotifyError> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(NotifyError::Gateway("first attempt fails".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn email_task() -> DeliveryTask {
        DeliveryTask::Email(EmailMessage {
            to: "maria@example.com".to_string(),
            subject: "subject".to_string(),
            text: "text".to_string(),
        })
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let mail = Arc::new(FailingMail {
            attempts: AtomicU32::new(0),
        });
        let channels = Channels {
            mail: Some(mail.clone()),
            sms: None,
        };

        deliver_with_retry(&channels, email_task(), MAX_ATTEMPTS).await;

        assert_eq!(mail.attempts.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn stops_retrying_after_success() {
        let mail = Arc::new(FlakyMail {
            attempts: AtomicU32::new(0),
        });
        let channels = Channels {
            mail: Some(mail.clone()),
            sms: None,
        };

        deliver_with_retry(&channels, email_task(), MAX_ATTEMPTS).await;

        assert_eq!(mail.attempts.load(Ordering::SeqCst), 2);
    }
}
