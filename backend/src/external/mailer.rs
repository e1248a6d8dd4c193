//! Mail relay client
//!
//! Sends completion emails through an HTTP relay that accepts one JSON
//! message per request

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::NotificationConfig;
use crate::error::{AppError, AppResult};

/// Mail relay client
#[derive(Clone)]
pub struct MailerClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

/// A file attached to an outgoing email
#[derive(Debug, Clone, Serialize)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    /// Base64 encoded body
    pub content_base64: String,
}

/// Message accepted by the relay
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    id: Option<String>,
}

impl MailerClient {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Send one message; returns the relay's message id when it reports one
    pub async fn send(&self, email: &OutgoingEmail) -> AppResult<Option<String>> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Mail relay request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Mail relay error: {} - {}",
                status, body
            )));
        }

        // Some relays answer 202 with an empty body
        let body = response.text().await.unwrap_or_default();
        let id = serde_json::from_str::<RelayResponse>(&body)
            .ok()
            .and_then(|r| r.id);
        Ok(id)
    }
}
