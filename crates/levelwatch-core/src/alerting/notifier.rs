//! Notification delivery for threshold alerts

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::SmsConfig;
use crate::error::NotifyError;

/// SMSAPI error codes that mean our credentials were refused
const AUTH_ERROR_CODES: [i64; 2] = [101, 102];

/// Delivers alert text to a preconfigured destination.
///
/// Implementations report failure but never retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a single message
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Sends alerts as SMS through the SMSAPI gateway
pub struct SmsNotifier {
    client: Client,
    config: SmsConfig,
}

impl SmsNotifier {
    /// Create a new SMS notifier. The request timeout comes from `config`.
    pub fn new(config: SmsConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Whether both the API key and the destination number are set
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some() && self.config.phone_number.is_some()
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| NotifyError::NotConfigured("SMS_API_KEY not configured".to_string()))?;
        let phone_number = self.config.phone_number.as_deref().ok_or_else(|| {
            NotifyError::NotConfigured("SMS_PHONE_NUMBER not configured".to_string())
        })?;

        let params = [
            ("to", phone_number),
            ("message", message),
            ("from", self.config.sender.as_str()),
            ("format", "json"),
        ];

        debug!(to = %phone_number, from = %self.config.sender, "Sending SMS");

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| NotifyError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotifyError::Unreachable(format!("Failed to read response: {e}")))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(NotifyError::Unauthorized(format!(
                "SMS API returned status {status}: {body}"
            )));
        }

        if !status.is_success() {
            return Err(NotifyError::Malformed(format!(
                "SMS API returned status {status}: {body}"
            )));
        }

        let parsed: SmsApiResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                // The gateway accepted the request; an odd body is not worth failing over.
                warn!(error = %e, response = %body, "Unexpected SMS API response");
                return Ok(());
            }
        };

        if let Some(code) = parsed.error.filter(|code| *code != 0) {
            let message = parsed.message.unwrap_or_default();
            if AUTH_ERROR_CODES.contains(&code) {
                return Err(NotifyError::Unauthorized(format!(
                    "SMS API error {code}: {message}"
                )));
            }
            return Err(NotifyError::Rejected { code, message });
        }

        match parsed.list.first() {
            Some(entry) => info!(
                message_id = %entry.id,
                points = entry.points,
                "SMS sent successfully"
            ),
            None => info!(response = %body, "SMS sent successfully"),
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SmsApiResponse {
    #[serde(default)]
    error: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    list: Vec<SmsApiEntry>,
}

#[derive(Debug, Deserialize)]
struct SmsApiEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    points: f64,
}
