//! Reusable formula template models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Ingredient;

/// A named percentage-only formula that batches are started from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaTemplate {
    pub id: Uuid,
    pub name: String,
    pub company_name: Option<String>,
    /// Percentages sum to 100 (checked at creation)
    pub ingredients: Vec<Ingredient>,
    pub created_at: DateTime<Utc>,
}
