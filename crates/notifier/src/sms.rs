//! SMS gateway client.
//!
//! Outbound calls go to a device-based SMS gateway:
//! `POST {base_url}/gateway/devices/{device_id}/send-sms` with an
//! `x-api-key` header. Delivery failures are logged and reported as
//! `false`; they never propagate to the transition caller.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::NotifyError;

/// Normalize a contact number to the `+63` international form.
///
/// Strips every non-digit, rewrites a leading `0` national prefix, and
/// accepts numbers already carrying the `63` country code.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    if let Some(rest) = digits.strip_prefix('0') {
        return Some(format!("+63{rest}"));
    }
    if let Some(rest) = digits.strip_prefix("63") {
        return Some(format!("+63{rest}"));
    }
    Some(format!("+{digits}"))
}

#[derive(Debug, Serialize)]
struct SendSmsRequest {
    recipients: Vec<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SendSmsResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Clone, Debug)]
pub struct SmsClient {
    client: Client,
    base_url: String,
    device_id: String,
    api_key: String,
}

impl SmsClient {
    pub fn new(client: Client, base_url: String, device_id: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            device_id,
            api_key,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/gateway/devices/{}/send-sms",
            self.base_url.trim_end_matches('/'),
            self.device_id
        )
    }

    /// Deliver one message, surfacing the failure for the retry loop.
    pub(crate) async fn try_send(&self, recipient: &str, message: &str) -> Result<(), NotifyError> {
        let body = SendSmsRequest {
            recipients: vec![recipient.to_string()],
            message: message.to_string(),
        };
        let response = self
            .client
            .post(self.url())
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Gateway(format!(
                "sms gateway answered {status}"
            )));
        }
        let parsed = response.json::<SendSmsResponse>().await?;
        if !parsed.success {
            return Err(NotifyError::Gateway(
                "sms gateway reported failure".to_string(),
            ));
        }
        Ok(())
    }

    /// Fire-and-forget variant: failures are logged, never raised.
    pub async fn send(&self, recipient: &str, message: &str) -> bool {
        match self.try_send(recipient, message).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("sms delivery to {recipient} failed: {err}");
                false
            }
        }
    }
}
