//! Report handlers: row model, HTML, print view and spreadsheet download

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use shared::render::{render_html, render_print, to_sheet};
use shared::{format_report, FormulaReport};

use crate::error::AppResult;
use crate::services::export::{
    csv_file_name, encode_csv, export_file_name, CSV_CONTENT_TYPE, XLSX_CONTENT_TYPE,
};
use crate::services::{BatchService, ExportService};
use crate::AppState;

async fn load_report(state: &AppState, batch_id: Uuid) -> AppResult<FormulaReport> {
    let service = BatchService::new(state.db.clone(), state.config.blending.settings());
    let batch = service.get_batch(batch_id).await?;
    Ok(format_report(&batch.notification()?))
}

/// Report rows as JSON
pub async fn get_report(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<FormulaReport>> {
    Ok(Json(load_report(&state, batch_id).await?))
}

/// Report as the HTML email body
pub async fn get_report_html(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Html<String>> {
    let report = load_report(&state, batch_id).await?;
    Ok(Html(render_html(&report)))
}

/// Report as the plain-text print view
pub async fn get_report_print(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Response> {
    let report = load_report(&state, batch_id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_print(&report),
    )
        .into_response())
}

fn download(content_type: &str, file_name: &str, body: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', ""));
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// Report as the workbook that is emailed and uploaded
pub async fn export_xlsx(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Response> {
    let report = load_report(&state, batch_id).await?;
    let body = ExportService::new(&state.config).spreadsheet(&report)?;
    Ok(download(XLSX_CONTENT_TYPE, &export_file_name(&report), body))
}

/// Report as a CSV download
pub async fn export_csv(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Response> {
    let report = load_report(&state, batch_id).await?;
    let body = encode_csv(&to_sheet(&report))?;
    Ok(download(CSV_CONTENT_TYPE, &csv_file_name(&report), body))
}
