//! Formula report row model
//!
//! One pure formatting pass produces the rows that the spreadsheet, HTML and
//! print renderers all consume, so every target shows the same numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::GRAMS_DP;
use crate::models::{BatchNotification, Ingredient};
use crate::types::{format_fixed, parse_decimal, round_fixed};
use crate::units::{gallons, GALLONS_DP, NOT_APPLICABLE};

/// Decimal places shown for percentages
pub const PERCENT_DP: u32 = 2;

/// One rendered table line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub name: String,
    pub percentage_display: String,
    pub grams_display: String,
    pub gallons_display: String,
    /// Fragrance lines are emphasized in every target
    pub highlight: bool,
    /// Rounded values behind the display strings
    pub percentage: Decimal,
    pub grams: Option<Decimal>,
    pub gallons: Option<Decimal>,
}

/// The full table for one calculated batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormulaReport {
    pub company_name: String,
    pub project_name: String,
    pub rows: Vec<ReportRow>,
    pub total_row: ReportRow,
}

fn percentage_display(percentage: Decimal) -> String {
    format!("{}%", format_fixed(percentage, PERCENT_DP))
}

fn optional_display(value: Option<Decimal>, dp: u32) -> String {
    value
        .map(|v| format_fixed(v, dp))
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

/// Format one calculated ingredient
pub fn format_row(ingredient: &Ingredient) -> ReportRow {
    let percentage = round_fixed(ingredient.percentage, PERCENT_DP);
    let grams = ingredient
        .calculated_grams
        .map(|g| round_fixed(g, GRAMS_DP));
    let gallons = grams.and_then(|g| gallons(&ingredient.name, g));

    ReportRow {
        name: ingredient.name.clone(),
        percentage_display: percentage_display(percentage),
        grams_display: optional_display(grams, GRAMS_DP),
        gallons_display: optional_display(gallons, GALLONS_DP),
        highlight: ingredient.is_fragrance(),
        percentage,
        grams,
        gallons,
    }
}

/// The footer line: always 100%, the stored total, no gallons
pub fn format_total_row(total_batch_grams: &str) -> ReportRow {
    let grams = parse_decimal(total_batch_grams).map(|g| round_fixed(g, GRAMS_DP));
    let percentage = round_fixed(Decimal::ONE_HUNDRED, PERCENT_DP);

    ReportRow {
        name: "Total".to_string(),
        percentage_display: percentage_display(percentage),
        grams_display: grams
            .map(|g| format_fixed(g, GRAMS_DP))
            .unwrap_or_else(|| total_batch_grams.trim().to_string()),
        gallons_display: String::new(),
        highlight: false,
        percentage,
        grams,
        gallons: None,
    }
}

/// Build the report for a calculated batch
pub fn format_report(batch: &BatchNotification) -> FormulaReport {
    FormulaReport {
        company_name: batch.company_name.clone(),
        project_name: batch.project_name.clone(),
        rows: batch.calculated_ingredients.iter().map(format_row).collect(),
        total_row: format_total_row(&batch.total_batch_grams),
    }
}
