//! HTTP handlers for sample and production batch endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Batch, CalcParams, Ingredient};
use crate::services::batch::{BatchFilter, BatchService, BillBatchInput, CreateBatchInput};
use crate::services::{DeliveryOutcome, ExportService, NotificationService};
use crate::AppState;
use shared::{format_report, CalculatedFormula};

fn batch_service(state: &AppState) -> BatchService {
    BatchService::new(state.db.clone(), state.config.blending.settings())
}

/// Create a new batch
pub async fn create_batch(
    State(state): State<AppState>,
    Json(input): Json<CreateBatchInput>,
) -> AppResult<(StatusCode, Json<Batch>)> {
    let batch = batch_service(&state).create_batch(input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// Get a batch by ID
pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Batch>> {
    let batch = batch_service(&state).get_batch(batch_id).await?;
    Ok(Json(batch))
}

/// List batches, optionally filtered by kind and status
pub async fn list_batches(
    State(state): State<AppState>,
    Query(filter): Query<BatchFilter>,
) -> AppResult<Json<Vec<Batch>>> {
    let batches = batch_service(&state).list_batches(filter).await?;
    Ok(Json(batches))
}

/// Replace a pending batch's ingredient list
pub async fn replace_ingredients(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(ingredients): Json<Vec<Ingredient>>,
) -> AppResult<Json<Batch>> {
    let batch = batch_service(&state)
        .replace_ingredients(batch_id, ingredients)
        .await?;
    Ok(Json(batch))
}

/// Calculate without saving
pub async fn preview_calculation(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(params): Json<CalcParams>,
) -> AppResult<Json<CalculatedFormula>> {
    let result = batch_service(&state).preview(batch_id, &params).await?;
    Ok(Json(result))
}

/// Calculate and save
pub async fn calculate_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(params): Json<CalcParams>,
) -> AppResult<Json<Batch>> {
    let batch = batch_service(&state)
        .save_calculation(batch_id, params)
        .await?;
    Ok(Json(batch))
}

/// Completion result, including what happened downstream
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub batch: Batch,
    pub notification: DeliveryOutcome,
    pub export: DeliveryOutcome,
    /// Non-fatal problems to show the operator
    pub warnings: Vec<String>,
}

/// Complete a calculated batch, then email and export it.
///
/// The batch stays completed whatever happens to the email or export.
pub async fn complete_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<CompletionResponse>> {
    let service = batch_service(&state);
    let batch = service.complete_batch(batch_id).await?;

    let report = format_report(&batch.notification()?);
    let notifier = NotificationService::new(&state.config);
    let exporter = ExportService::new(&state.config);

    let notification = match exporter.spreadsheet(&report) {
        Ok(spreadsheet) => notifier.notify_batch_completed(&report, &spreadsheet).await,
        Err(e) => DeliveryOutcome::Failed { error: e.to_string() },
    };
    let export = exporter.upload_report(&report).await;

    let mut warnings = Vec::new();
    for (channel, outcome) in [("email", &notification), ("export", &export)] {
        if outcome.is_failure() {
            warnings.push(format!(
                "{} failed: {}",
                channel,
                outcome.detail().unwrap_or_default()
            ));
        }
        if let Err(e) = service.record_delivery(batch_id, channel, outcome).await {
            tracing::warn!(batch_id = %batch_id, "Could not record {} delivery: {}", channel, e);
        }
    }

    Ok(Json(CompletionResponse {
        batch,
        notification,
        export,
        warnings,
    }))
}

/// Record the invoice for a completed batch
pub async fn bill_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<BillBatchInput>,
) -> AppResult<Json<Batch>> {
    let batch = batch_service(&state).bill_batch(batch_id, input).await?;
    Ok(Json(batch))
}
