//! Sample and production batch models
//!
//! A batch owns its template ingredient list and its calculation inputs.
//! The calculated ingredient list and total are derived data. Editing the
//! ingredients drops them until the calculator runs again, and calculation
//! inputs are only ever saved together with the result they produce.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{CalcMode, CalcParams, Ingredient};
use crate::calculator::{self, CalcError, CalculatedFormula};
use crate::size::default_fill_from;
use crate::types::BlendingSettings;

/// Kind of blending job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    Sample,
    Production,
}

impl BatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchKind::Sample => "sample",
            BatchKind::Production => "production",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sample" => Some(BatchKind::Sample),
            "production" => Some(BatchKind::Production),
            _ => None,
        }
    }
}

/// Blending status as stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    #[default]
    Pending,
    Completed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Pending => "pending",
            BatchStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BatchStatus::Pending),
            "completed" => Some(BatchStatus::Completed),
            _ => None,
        }
    }
}

/// Where a batch is in its lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchStage {
    Pending,
    Calculated,
    Completed,
    Billed,
}

impl std::fmt::Display for BatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStage::Pending => write!(f, "Pending"),
            BatchStage::Calculated => write!(f, "Calculated"),
            BatchStage::Completed => write!(f, "Completed"),
            BatchStage::Billed => write!(f, "Billed"),
        }
    }
}

/// Rejected lifecycle operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("batch is completed and can no longer be edited")]
    AlreadyCompleted,

    #[error("batch has no saved calculation")]
    NotCalculated,

    #[error("batch must be completed before it is billed")]
    NotCompleted,

    #[error("batch has already been billed")]
    AlreadyBilled,

    #[error(transparent)]
    Calculation(#[from] CalcError),
}

/// A sample or production blending job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: Uuid,
    pub kind: BatchKind,
    pub company_name: String,
    pub project_name: String,
    pub sku: Option<String>,
    pub size: Option<String>,
    /// Unit count; production batches only
    pub quantity: Option<u32>,
    pub template_id: Option<Uuid>,
    pub ingredients: Vec<Ingredient>,
    pub calculated_ingredients: Option<Vec<Ingredient>>,
    pub total_batch_grams: Option<Decimal>,
    pub calc_params: Option<CalcParams>,
    pub status: BatchStatus,
    pub billed: bool,
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub billed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Store payloads
// ============================================================================

/// Update written after a calculation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationUpdate {
    pub calculated_ingredients: Vec<Ingredient>,
    /// Two-decimal text
    pub total_batch_grams: String,
    pub calc_params: CalcParams,
    pub last_saved_at: DateTime<Utc>,
}

/// Update written when an operator finalizes a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionUpdate {
    pub status: BatchStatus,
    pub completed_at: DateTime<Utc>,
}

/// Update written when a completed batch is invoiced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingUpdate {
    pub billed: bool,
    pub invoice_number: String,
    pub billed_at: DateTime<Utc>,
}

/// Input handed to the notification and export collaborators
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchNotification {
    pub company_name: String,
    pub project_name: String,
    pub total_batch_grams: String,
    pub calculated_ingredients: Vec<Ingredient>,
}

impl Batch {
    pub fn stage(&self) -> BatchStage {
        match (self.status, self.billed) {
            (BatchStatus::Completed, true) => BatchStage::Billed,
            (BatchStatus::Completed, false) => BatchStage::Completed,
            (BatchStatus::Pending, _) if self.calculated_ingredients.is_some() => {
                BatchStage::Calculated
            }
            (BatchStatus::Pending, _) => BatchStage::Pending,
        }
    }

    /// Unit count fed to auto mode; samples are a single unit
    pub fn unit_count(&self) -> Option<u32> {
        match self.kind {
            BatchKind::Production => self.quantity,
            BatchKind::Sample => None,
        }
    }

    /// Saved inputs, or a fresh auto-mode form pre-filled from the SKU,
    /// project name or size text
    pub fn calc_params_or_default(&self) -> CalcParams {
        if let Some(params) = &self.calc_params {
            return params.clone();
        }
        let parsed = default_fill_from([
            self.sku.as_deref(),
            Some(self.project_name.as_str()),
            self.size.as_deref(),
        ]);
        CalcParams {
            mode: CalcMode::Auto,
            fill_weight: parsed
                .as_ref()
                .and_then(|p| crate::types::parse_decimal(&p.weight)),
            fill_unit: parsed.map(|p| p.unit).unwrap_or_default(),
            ..Default::default()
        }
    }

    fn ensure_editable(&self) -> Result<(), BatchError> {
        if self.status == BatchStatus::Completed {
            return Err(BatchError::AlreadyCompleted);
        }
        Ok(())
    }

    fn invalidate_calculation(&mut self) {
        self.calculated_ingredients = None;
        self.total_batch_grams = None;
    }

    /// Replace the template ingredient list; derived masses are dropped
    pub fn replace_ingredients(&mut self, ingredients: Vec<Ingredient>) -> Result<(), BatchError> {
        self.ensure_editable()?;
        self.ingredients = ingredients.iter().map(Ingredient::as_template).collect();
        self.invalidate_calculation();
        Ok(())
    }

    /// Run the calculator against the current ingredients
    pub fn preview(
        &self,
        params: &CalcParams,
        settings: &BlendingSettings,
    ) -> Result<CalculatedFormula, CalcError> {
        let calculation = params.resolve(settings)?;
        calculator::calculate(&self.ingredients, &calculation, self.unit_count())
    }

    /// Recalculate from `params` and store the result, fully replacing any
    /// previous calculation
    pub fn recalculate(
        &mut self,
        params: CalcParams,
        settings: &BlendingSettings,
        now: DateTime<Utc>,
    ) -> Result<CalculationUpdate, BatchError> {
        self.ensure_editable()?;
        let result = self.preview(&params, settings)?;

        let update = CalculationUpdate {
            total_batch_grams: result.total_display(),
            calculated_ingredients: result.ingredients.clone(),
            calc_params: params.clone(),
            last_saved_at: now,
        };

        self.calculated_ingredients = Some(result.ingredients);
        self.total_batch_grams = Some(result.total_grams);
        self.calc_params = Some(params);
        self.last_saved_at = Some(now);
        Ok(update)
    }

    /// Finalize a calculated batch
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<CompletionUpdate, BatchError> {
        self.ensure_editable()?;
        if self.calculated_ingredients.is_none() || self.total_batch_grams.is_none() {
            return Err(BatchError::NotCalculated);
        }
        self.status = BatchStatus::Completed;
        self.completed_at = Some(now);
        Ok(CompletionUpdate {
            status: BatchStatus::Completed,
            completed_at: now,
        })
    }

    /// Record the invoice for a completed batch
    pub fn bill(
        &mut self,
        invoice_number: &str,
        now: DateTime<Utc>,
    ) -> Result<BillingUpdate, BatchError> {
        if self.status != BatchStatus::Completed {
            return Err(BatchError::NotCompleted);
        }
        if self.billed {
            return Err(BatchError::AlreadyBilled);
        }
        let invoice_number = invoice_number.trim().to_string();
        self.billed = true;
        self.invoice_number = Some(invoice_number.clone());
        self.billed_at = Some(now);
        Ok(BillingUpdate {
            billed: true,
            invoice_number,
            billed_at: now,
        })
    }

    /// Notification/export input for a calculated batch
    pub fn notification(&self) -> Result<BatchNotification, BatchError> {
        match (&self.calculated_ingredients, self.total_batch_grams) {
            (Some(ingredients), Some(total)) => Ok(BatchNotification {
                company_name: self.company_name.clone(),
                project_name: self.project_name.clone(),
                total_batch_grams: crate::types::format_fixed(total, calculator::GRAMS_DP),
                calculated_ingredients: ingredients.clone(),
            }),
            _ => Err(BatchError::NotCalculated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FillUnit;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn production_batch() -> Batch {
        Batch {
            id: Uuid::new_v4(),
            kind: BatchKind::Production,
            company_name: "Acme Home".to_string(),
            project_name: "Linen Spray 100ml".to_string(),
            sku: None,
            size: None,
            quantity: Some(1000),
            template_id: None,
            ingredients: vec![
                Ingredient::new("B40 190 Proof", dec("40")),
                Ingredient::new("DI Water", dec("58")),
                Ingredient::oil("Fragrance Oil", dec("2")),
            ],
            calculated_ingredients: None,
            total_batch_grams: None,
            calc_params: None,
            status: BatchStatus::Pending,
            billed: false,
            invoice_number: None,
            created_at: now(),
            last_saved_at: None,
            completed_at: None,
            billed_at: None,
        }
    }

    #[test]
    fn test_default_params_from_project_name() {
        let batch = production_batch();
        let params = batch.calc_params_or_default();
        assert_eq!(params.mode, CalcMode::Auto);
        assert_eq!(params.fill_weight, Some(dec("100")));
        assert_eq!(params.fill_unit, FillUnit::Ml);
    }

    #[test]
    fn test_sku_takes_precedence_for_default_size() {
        let mut batch = production_batch();
        batch.sku = Some("LS-4OZ".to_string());
        let params = batch.calc_params_or_default();
        assert_eq!(params.fill_weight, Some(dec("4")));
        assert_eq!(params.fill_unit, FillUnit::Oz);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut batch = production_batch();
        assert_eq!(batch.stage(), BatchStage::Pending);

        let params = batch.calc_params_or_default();
        let update = batch
            .recalculate(params, &BlendingSettings::default(), now())
            .unwrap();
        assert_eq!(update.total_batch_grams, "103000.00");
        assert_eq!(batch.stage(), BatchStage::Calculated);

        let completion = batch.complete(now()).unwrap();
        assert_eq!(completion.status, BatchStatus::Completed);
        assert_eq!(batch.stage(), BatchStage::Completed);

        let billing = batch.bill(" INV-7 ", now()).unwrap();
        assert_eq!(billing.invoice_number, "INV-7");
        assert_eq!(batch.stage(), BatchStage::Billed);
    }

    #[test]
    fn test_editing_invalidates_calculation() {
        let mut batch = production_batch();
        let params = batch.calc_params_or_default();
        batch
            .recalculate(params.clone(), &BlendingSettings::default(), now())
            .unwrap();

        batch
            .replace_ingredients(vec![Ingredient::new("DI Water", dec("100"))])
            .unwrap();
        assert!(batch.calculated_ingredients.is_none());
        assert!(batch.total_batch_grams.is_none());
        assert_eq!(batch.complete(now()), Err(BatchError::NotCalculated));

        batch
            .recalculate(params, &BlendingSettings::default(), now())
            .unwrap();
        assert_eq!(batch.stage(), BatchStage::Calculated);
    }

    #[test]
    fn test_incomplete_input_keeps_previous_state() {
        let mut batch = production_batch();
        let params = CalcParams {
            mode: CalcMode::Fragrance,
            ..Default::default()
        };
        let err = batch
            .recalculate(params, &BlendingSettings::default(), now())
            .unwrap_err();
        assert_eq!(
            err,
            BatchError::Calculation(CalcError::MissingField {
                field: "fragranceGrams"
            })
        );
        assert!(batch.calc_params.is_none());
        assert!(batch.last_saved_at.is_none());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut batch = production_batch();
        assert_eq!(batch.bill("INV-1", now()), Err(BatchError::NotCompleted));
        assert_eq!(batch.notification(), Err(BatchError::NotCalculated));

        let params = batch.calc_params_or_default();
        batch
            .recalculate(params.clone(), &BlendingSettings::default(), now())
            .unwrap();
        batch.complete(now()).unwrap();

        assert_eq!(batch.complete(now()), Err(BatchError::AlreadyCompleted));
        assert_eq!(
            batch.recalculate(params, &BlendingSettings::default(), now()),
            Err(BatchError::AlreadyCompleted)
        );

        batch.bill("INV-1", now()).unwrap();
        assert_eq!(batch.bill("INV-2", now()), Err(BatchError::AlreadyBilled));
    }

    #[test]
    fn test_sample_batches_ignore_quantity() {
        let mut batch = production_batch();
        batch.kind = BatchKind::Sample;
        assert_eq!(batch.unit_count(), None);

        let params = batch.calc_params_or_default();
        let result = batch.preview(&params, &BlendingSettings::default()).unwrap();
        assert_eq!(result.total_display(), "103.00");
    }

    #[test]
    fn test_notification_payload() {
        let mut batch = production_batch();
        let params = batch.calc_params_or_default();
        batch
            .recalculate(params, &BlendingSettings::default(), now())
            .unwrap();

        let payload = batch.notification().unwrap();
        assert_eq!(payload.company_name, "Acme Home");
        assert_eq!(payload.total_batch_grams, "103000.00");
        assert_eq!(payload.calculated_ingredients.len(), 3);

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("calculatedIngredients").is_some());
        assert!(json.get("totalBatchGrams").is_some());
    }
}
