//! Error handling for the Blending Operations Suite
//!
//! Provides consistent JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{BatchError, CalcError, PercentageSumError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Incomplete calculation input: {0}")]
    IncompleteCalculation(#[from] CalcError),

    #[error(transparent)]
    PercentageTotal(#[from] PercentageSumError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Calculation(calc) => AppError::IncompleteCalculation(calc),
            other => AppError::InvalidStateTransition(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_default();
        AppError::Validation {
            field,
            message: errors.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Percentage total reported back when a template does not sum to 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_total: Option<Decimal>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            actual_total: None,
        }
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::IncompleteCalculation(err) => {
                let field = match err {
                    CalcError::MissingField { field } | CalcError::InvalidField { field } => {
                        Some(field.to_string())
                    }
                    _ => None,
                };
                (
                    StatusCode::BAD_REQUEST,
                    ErrorDetail {
                        field,
                        ..ErrorDetail::new("INCOMPLETE_CALCULATION", err.to_string())
                    },
                )
            }
            AppError::PercentageTotal(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some("ingredients".to_string()),
                    actual_total: Some(err.actual_total),
                    ..ErrorDetail::new("PERCENTAGE_TOTAL", err.to_string())
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail::new("CONFLICT", msg.clone()),
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("INVALID_STATE_TRANSITION", msg.clone()),
            ),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new("EXTERNAL_SERVICE_ERROR", format!("External service error: {}", msg)),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_percentage_error_reports_total() {
        let err = AppError::from(PercentageSumError {
            actual_total: Decimal::from_str("99.9").unwrap(),
        });
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "PERCENTAGE_TOTAL");
        assert_eq!(detail.actual_total, Some(Decimal::from_str("99.9").unwrap()));
    }

    #[test]
    fn test_incomplete_input_names_field() {
        let err = AppError::from(CalcError::MissingField { field: "fillWeight" });
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.field.as_deref(), Some("fillWeight"));
    }

    #[test]
    fn test_batch_errors_map_to_status() {
        let (status, _) = AppError::from(BatchError::NotCompleted).status_and_detail();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, detail) =
            AppError::from(BatchError::Calculation(CalcError::NoOilIngredient)).status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "INCOMPLETE_CALCULATION");
    }
}
