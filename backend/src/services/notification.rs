//! Completion notification service
//!
//! Emails the distribution list an HTML rendering of a completed batch with
//! the spreadsheet attached. Delivery never affects the stored batch.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use shared::render::render_html;
use shared::FormulaReport;

use crate::config::Config;
use crate::external::{EmailAttachment, MailerClient, OutgoingEmail};
use crate::services::export::{export_file_name, XLSX_CONTENT_TYPE};

/// Result of one outbound delivery attempt
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent { reference: Option<String> },
    Skipped { reason: String },
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Sent { .. } => "sent",
            DeliveryOutcome::Skipped { .. } => "skipped",
            DeliveryOutcome::Failed { .. } => "failed",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            DeliveryOutcome::Sent { reference } => reference.as_deref(),
            DeliveryOutcome::Skipped { reason } => Some(reason),
            DeliveryOutcome::Failed { error } => Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DeliveryOutcome::Failed { .. })
    }
}

#[derive(Clone)]
struct MailSettings {
    client: MailerClient,
    from_address: String,
    distribution_address: String,
}

/// Notification service
#[derive(Clone)]
pub struct NotificationService {
    mail: Option<MailSettings>,
}

/// Build the completion email for a report
pub fn completion_email(
    report: &FormulaReport,
    spreadsheet: &[u8],
    from: &str,
    to: &str,
) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        from: from.to_string(),
        subject: format!(
            "Blending completed: {} - {}",
            report.company_name, report.project_name
        ),
        html: render_html(report),
        attachments: vec![EmailAttachment {
            filename: export_file_name(report),
            content_type: XLSX_CONTENT_TYPE.to_string(),
            content_base64: STANDARD.encode(spreadsheet),
        }],
    }
}

impl NotificationService {
    pub fn new(config: &Config) -> Self {
        match &config.notification {
            Some(n) => Self {
                mail: Some(MailSettings {
                    client: MailerClient::new(n),
                    from_address: n.from_address.clone(),
                    distribution_address: n.distribution_address.clone(),
                }),
            },
            None => Self::disabled(),
        }
    }

    /// Service with email disabled
    pub fn disabled() -> Self {
        Self { mail: None }
    }

    /// Email the distribution list about a completed batch
    pub async fn notify_batch_completed(
        &self,
        report: &FormulaReport,
        spreadsheet: &[u8],
    ) -> DeliveryOutcome {
        let Some(mail) = &self.mail else {
            return DeliveryOutcome::Skipped {
                reason: "notification email is not configured".to_string(),
            };
        };

        let email = completion_email(
            report,
            spreadsheet,
            &mail.from_address,
            &mail.distribution_address,
        );

        match mail.client.send(&email).await {
            Ok(reference) => {
                tracing::info!(to = %email.to, "Completion email sent");
                DeliveryOutcome::Sent { reference }
            }
            Err(e) => {
                tracing::warn!("Completion email failed: {}", e);
                DeliveryOutcome::Failed { error: e.to_string() }
            }
        }
    }
}
