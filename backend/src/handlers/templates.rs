//! HTTP handlers for formula template endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::FormulaTemplate;
use crate::services::template::{CreateTemplateInput, FormulaTemplateService};
use crate::AppState;

/// Create a new formula template
pub async fn create_template(
    State(state): State<AppState>,
    Json(input): Json<CreateTemplateInput>,
) -> AppResult<(StatusCode, Json<FormulaTemplate>)> {
    let service = FormulaTemplateService::new(state.db);
    let template = service.create_template(input).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// Get a formula template by ID
pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> AppResult<Json<FormulaTemplate>> {
    let service = FormulaTemplateService::new(state.db);
    let template = service.get_template(template_id).await?;
    Ok(Json(template))
}

/// List all formula templates
pub async fn list_templates(State(state): State<AppState>) -> AppResult<Json<Vec<FormulaTemplate>>> {
    let service = FormulaTemplateService::new(state.db);
    let templates = service.list_templates().await?;
    Ok(Json(templates))
}
