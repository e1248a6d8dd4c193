//! Database models for the Blending Operations Suite
//!
//! Re-exports models from the shared crate and adds the row types the
//! store reads back

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub use shared::models::*;

use crate::error::AppError;

/// `formula_templates` row
#[derive(Debug, FromRow)]
pub struct TemplateRow {
    pub id: Uuid,
    pub name: String,
    pub company_name: Option<String>,
    pub ingredients: Json<Vec<Ingredient>>,
    pub created_at: DateTime<Utc>,
}

impl From<TemplateRow> for FormulaTemplate {
    fn from(row: TemplateRow) -> Self {
        FormulaTemplate {
            id: row.id,
            name: row.name,
            company_name: row.company_name,
            ingredients: row.ingredients.0,
            created_at: row.created_at,
        }
    }
}

/// `batches` row
#[derive(Debug, FromRow)]
pub struct BatchRow {
    pub id: Uuid,
    pub kind: String,
    pub company_name: String,
    pub project_name: String,
    pub sku: Option<String>,
    pub size: Option<String>,
    pub quantity: Option<i32>,
    pub template_id: Option<Uuid>,
    pub ingredients: Json<Vec<Ingredient>>,
    pub calculated_ingredients: Option<Json<Vec<Ingredient>>>,
    pub total_batch_grams: Option<Decimal>,
    pub calc_params: Option<Json<CalcParams>>,
    pub status: String,
    pub billed: bool,
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub billed_at: Option<DateTime<Utc>>,
}

impl TryFrom<BatchRow> for Batch {
    type Error = AppError;

    fn try_from(row: BatchRow) -> Result<Self, Self::Error> {
        let kind = BatchKind::from_str(&row.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown batch kind: {}", row.kind)))?;
        let status = BatchStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown batch status: {}", row.status)))?;
        let quantity = row
            .quantity
            .map(u32::try_from)
            .transpose()
            .map_err(|_| AppError::Internal("Negative batch quantity".to_string()))?;

        Ok(Batch {
            id: row.id,
            kind,
            company_name: row.company_name,
            project_name: row.project_name,
            sku: row.sku,
            size: row.size,
            quantity,
            template_id: row.template_id,
            ingredients: row.ingredients.0,
            calculated_ingredients: row.calculated_ingredients.map(|j| j.0),
            total_batch_grams: row.total_batch_grams,
            calc_params: row.calc_params.map(|j| j.0),
            status,
            billed: row.billed,
            invoice_number: row.invoice_number,
            created_at: row.created_at,
            last_saved_at: row.last_saved_at,
            completed_at: row.completed_at,
            billed_at: row.billed_at,
        })
    }
}
