//! Batch service for sample and production blending jobs
//!
//! Lifecycle rules live on [`Batch`] in the shared crate. This service loads
//! a batch, applies one transition in memory and writes the resulting
//! update. Writes are guarded on the stored status so a batch completed by
//! another request is never overwritten.

use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    Batch, BatchKind, BatchRow, BatchStatus, CalcParams, Ingredient, TemplateRow,
};
use crate::services::notification::DeliveryOutcome;
use shared::validation;
use shared::{BlendingSettings, CalculatedFormula};

const BATCH_COLUMNS: &str = r#"
    id, kind, company_name, project_name, sku, size, quantity, template_id,
    ingredients, calculated_ingredients, total_batch_grams, calc_params,
    status, billed, invoice_number, created_at, last_saved_at, completed_at,
    billed_at
"#;

/// Batch service
#[derive(Clone)]
pub struct BatchService {
    db: PgPool,
    settings: BlendingSettings,
}

/// Input for creating a batch
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchInput {
    pub kind: BatchKind,
    #[validate(length(min = 1, max = 255, message = "Company name must be between 1 and 255 characters"))]
    pub company_name: String,
    #[validate(length(min = 1, max = 255, message = "Project name must be between 1 and 255 characters"))]
    pub project_name: String,
    #[validate(length(max = 64, message = "SKU cannot exceed 64 characters"))]
    pub sku: Option<String>,
    #[validate(length(max = 64, message = "Size cannot exceed 64 characters"))]
    pub size: Option<String>,
    #[validate(range(min = 1, max = 1000000, message = "Quantity must be between 1 and 1000000"))]
    pub quantity: Option<u32>,
    /// Start from a stored template...
    pub template_id: Option<Uuid>,
    /// ...or from an explicit ingredient list
    pub ingredients: Option<Vec<Ingredient>>,
}

/// Query filters for listing batches
#[derive(Debug, Default, Deserialize)]
pub struct BatchFilter {
    pub kind: Option<BatchKind>,
    pub status: Option<BatchStatus>,
}

/// Input for billing a batch
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillBatchInput {
    pub invoice_number: String,
}

fn ingredient_error(message: &str) -> AppError {
    AppError::Validation {
        field: "ingredients".to_string(),
        message: message.to_string(),
    }
}

impl BatchService {
    pub fn new(db: PgPool, settings: BlendingSettings) -> Self {
        Self { db, settings }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get a batch by ID
    pub async fn get_batch(&self, batch_id: Uuid) -> AppResult<Batch> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM batches WHERE id = $1",
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        Batch::try_from(row)
    }

    /// List batches, newest first
    pub async fn list_batches(&self, filter: BatchFilter) -> AppResult<Vec<Batch>> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            SELECT {}
            FROM batches
            WHERE ($1::TEXT IS NULL OR kind = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
            BATCH_COLUMNS
        ))
        .bind(filter.kind.map(|k| k.as_str()))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Batch::try_from).collect()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a pending batch. Calculation inputs are pre-filled from the
    /// fill size found in the SKU, project name or size text.
    pub async fn create_batch(&self, input: CreateBatchInput) -> AppResult<Batch> {
        input.validate()?;

        let (template_id, ingredients) = match (input.template_id, input.ingredients) {
            (Some(template_id), None) => {
                let template = sqlx::query_as::<_, TemplateRow>(
                    r#"
                    SELECT id, name, company_name, ingredients, created_at
                    FROM formula_templates
                    WHERE id = $1
                    "#,
                )
                .bind(template_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Formula template".to_string()))?;
                (Some(template_id), template.ingredients.0)
            }
            (None, Some(ingredients)) => {
                validation::validate_ingredient_names(&ingredients).map_err(ingredient_error)?;
                validation::validate_percentage_range(&ingredients).map_err(ingredient_error)?;
                (None, ingredients)
            }
            _ => {
                return Err(AppError::ValidationError(
                    "Provide either templateId or ingredients".to_string(),
                ))
            }
        };

        let now = Utc::now();
        let mut batch = Batch {
            id: Uuid::new_v4(),
            kind: input.kind,
            company_name: input.company_name.trim().to_string(),
            project_name: input.project_name.trim().to_string(),
            sku: input.sku,
            size: input.size,
            quantity: input.quantity,
            template_id,
            ingredients: ingredients.iter().map(Ingredient::as_template).collect(),
            calculated_ingredients: None,
            total_batch_grams: None,
            calc_params: None,
            status: BatchStatus::Pending,
            billed: false,
            invoice_number: None,
            created_at: now,
            last_saved_at: None,
            completed_at: None,
            billed_at: None,
        };
        batch.calc_params = Some(batch.calc_params_or_default());

        let quantity = batch.quantity.map(|q| q as i32);
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            INSERT INTO batches (
                id, kind, company_name, project_name, sku, size, quantity,
                template_id, ingredients, calc_params, status, billed, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE, $12)
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(batch.id)
        .bind(batch.kind.as_str())
        .bind(&batch.company_name)
        .bind(&batch.project_name)
        .bind(&batch.sku)
        .bind(&batch.size)
        .bind(quantity)
        .bind(batch.template_id)
        .bind(Json(&batch.ingredients))
        .bind(batch.calc_params.as_ref().map(Json))
        .bind(batch.status.as_str())
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(batch_id = %row.id, kind = %row.kind, "Batch created");
        Batch::try_from(row)
    }

    /// Replace the template ingredient list; any saved calculation is dropped
    pub async fn replace_ingredients(
        &self,
        batch_id: Uuid,
        ingredients: Vec<Ingredient>,
    ) -> AppResult<Batch> {
        validation::validate_ingredient_names(&ingredients).map_err(ingredient_error)?;
        validation::validate_percentage_range(&ingredients).map_err(ingredient_error)?;

        let mut batch = self.get_batch(batch_id).await?;
        batch.replace_ingredients(ingredients)?;

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            UPDATE batches
            SET ingredients = $2,
                calculated_ingredients = NULL,
                total_batch_grams = NULL
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .bind(Json(&batch.ingredients))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Conflict("Batch changed while it was being updated".to_string()))?;

        Batch::try_from(row)
    }

    /// Run the calculator without saving anything
    pub async fn preview(&self, batch_id: Uuid, params: &CalcParams) -> AppResult<CalculatedFormula> {
        let batch = self.get_batch(batch_id).await?;
        Ok(batch.preview(params, &self.settings)?)
    }

    /// Recalculate and save the calculated list, total and inputs together.
    /// The write only lands if the ingredient list it was derived from is
    /// still the stored one.
    pub async fn save_calculation(&self, batch_id: Uuid, params: CalcParams) -> AppResult<Batch> {
        let mut batch = self.get_batch(batch_id).await?;
        let update = batch.recalculate(params, &self.settings, Utc::now())?;

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            UPDATE batches
            SET calculated_ingredients = $2,
                total_batch_grams = $3,
                calc_params = $4,
                last_saved_at = $5
            WHERE id = $1 AND status = 'pending' AND ingredients = $6
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .bind(Json(&update.calculated_ingredients))
        .bind(batch.total_batch_grams)
        .bind(Json(&update.calc_params))
        .bind(update.last_saved_at)
        .bind(Json(&batch.ingredients))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Conflict("Batch changed while it was being updated".to_string()))?;

        tracing::debug!(
            batch_id = %batch_id,
            mode = update.calc_params.mode.as_str(),
            total = %update.total_batch_grams,
            "Calculation saved"
        );
        Batch::try_from(row)
    }

    /// Mark a calculated batch completed
    pub async fn complete_batch(&self, batch_id: Uuid) -> AppResult<Batch> {
        let mut batch = self.get_batch(batch_id).await?;
        let update = batch.complete(Utc::now())?;

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            UPDATE batches
            SET status = $2, completed_at = $3
            WHERE id = $1 AND status = 'pending' AND calculated_ingredients IS NOT NULL
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .bind(update.status.as_str())
        .bind(update.completed_at)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Conflict("Batch changed while it was being updated".to_string()))?;

        tracing::info!(batch_id = %batch_id, "Batch completed");
        Batch::try_from(row)
    }

    /// Record the invoice for a completed batch
    pub async fn bill_batch(&self, batch_id: Uuid, input: BillBatchInput) -> AppResult<Batch> {
        validation::validate_invoice_number(&input.invoice_number).map_err(|message| {
            AppError::Validation {
                field: "invoiceNumber".to_string(),
                message: message.to_string(),
            }
        })?;

        let mut batch = self.get_batch(batch_id).await?;
        let update = batch.bill(&input.invoice_number, Utc::now())?;

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            UPDATE batches
            SET billed = $2, invoice_number = $3, billed_at = $4
            WHERE id = $1 AND status = 'completed' AND billed = FALSE
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .bind(update.billed)
        .bind(&update.invoice_number)
        .bind(update.billed_at)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Conflict("Batch changed while it was being updated".to_string()))?;

        tracing::info!(batch_id = %batch_id, invoice = %update.invoice_number, "Batch billed");
        Batch::try_from(row)
    }

    /// Log the outcome of an email or export attempt for a batch
    pub async fn record_delivery(
        &self,
        batch_id: Uuid,
        channel: &str,
        outcome: &DeliveryOutcome,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO batch_deliveries (id, batch_id, channel, outcome, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(batch_id)
        .bind(channel)
        .bind(outcome.as_str())
        .bind(outcome.detail())
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_deserializes_camel_case() {
        let input: CreateBatchInput = serde_json::from_str(
            r#"{
                "kind": "production",
                "companyName": "Acme Home",
                "projectName": "Linen Spray 100ml",
                "quantity": 1000,
                "ingredients": [
                    {"name": "DI Water", "percentage": "98"},
                    {"name": "Fragrance Oil", "percentage": 2, "isOil": true}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(input.kind, BatchKind::Production);
        assert_eq!(input.quantity, Some(1000));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let input = CreateBatchInput {
            kind: BatchKind::Production,
            company_name: "Acme Home".to_string(),
            project_name: "Linen Spray".to_string(),
            sku: None,
            size: None,
            quantity: Some(0),
            template_id: None,
            ingredients: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_stored_ingredients_reencode_identically() {
        // save_calculation matches the stored list by value
        let stored = serde_json::to_value(vec![
            Ingredient::new("DI Water", "58.50".parse().unwrap()),
            Ingredient::oil("Fragrance Oil", "2".parse().unwrap()),
        ])
        .unwrap();

        let loaded: Vec<Ingredient> = serde_json::from_value(stored.clone()).unwrap();
        assert_eq!(serde_json::to_value(&loaded).unwrap(), stored);

        let mut edited = loaded.clone();
        edited[0].percentage = "58.5".parse().unwrap();
        edited[1].name = "Vanilla Fragrance".to_string();
        assert_ne!(serde_json::to_value(&edited).unwrap(), stored);
    }

    #[test]
    fn test_filter_parses_query_values() {
        let filter: BatchFilter =
            serde_json::from_str(r#"{"kind": "sample", "status": "completed"}"#).unwrap();
        assert_eq!(filter.kind, Some(BatchKind::Sample));
        assert_eq!(filter.status, Some(BatchStatus::Completed));
    }
}
