//! Document library client
//!
//! Uploads exported spreadsheets into a per-company, per-project folder

use reqwest::Client;

use crate::config::ExportConfig;
use crate::error::{AppError, AppResult};

/// Document library client
#[derive(Clone)]
pub struct DocumentLibraryClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl DocumentLibraryClient {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.library_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    /// URL a file lands at; `path` segments must already be sanitized
    pub fn file_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Upload (or overwrite) a file and return its URL
    pub async fn upload(&self, path: &str, content_type: &str, body: Vec<u8>) -> AppResult<String> {
        let url = self.file_url(path);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Document library request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Document library error: {} - {}",
                status, body
            )));
        }

        Ok(url)
    }
}
