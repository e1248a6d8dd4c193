//! Validation utilities for formula templates and batches

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculator::{find_oil_ingredient, CalcError};
use crate::models::{total_percentage, Ingredient};
use crate::types::round_fixed;

/// Decimal places the percentage total is rounded to before comparison
pub const PERCENT_TOTAL_DP: u32 = 4;

/// A template whose percentages do not add up to 100
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Ingredient percentages must total 100%, got {actual_total}%")]
pub struct PercentageSumError {
    pub actual_total: Decimal,
}

// ============================================================================
// Formula Template Validations
// ============================================================================

/// Validate that template percentages sum to exactly 100 after rounding the
/// total to 4 places. Blank percentages count as zero.
pub fn validate_template_percentages(ingredients: &[Ingredient]) -> Result<(), PercentageSumError> {
    let total = round_fixed(total_percentage(ingredients), PERCENT_TOTAL_DP);
    if total != Decimal::ONE_HUNDRED {
        return Err(PercentageSumError {
            actual_total: total.normalize(),
        });
    }
    Ok(())
}

/// Validate each percentage is within 0-100
pub fn validate_percentage_range(ingredients: &[Ingredient]) -> Result<(), &'static str> {
    for ingredient in ingredients {
        if ingredient.percentage < Decimal::ZERO {
            return Err("Ingredient percentages cannot be negative");
        }
        if ingredient.percentage > Decimal::ONE_HUNDRED {
            return Err("Ingredient percentages cannot exceed 100");
        }
    }
    Ok(())
}

/// Validate every ingredient line has a name
pub fn validate_ingredient_names(ingredients: &[Ingredient]) -> Result<(), &'static str> {
    if ingredients.is_empty() {
        return Err("A formula needs at least one ingredient");
    }
    if ingredients.iter().any(|i| i.name.trim().is_empty()) {
        return Err("Every ingredient needs a name");
    }
    Ok(())
}

/// Validate the oil is unambiguous: at most one flagged line, and with
/// none flagged at most one "fragrance" name
pub fn validate_single_oil(ingredients: &[Ingredient]) -> Result<(), &'static str> {
    if ingredients.iter().filter(|i| i.is_oil).count() > 1 {
        return Err("Only one ingredient can be flagged as the oil");
    }
    if let Err(CalcError::AmbiguousOilIngredient) = find_oil_ingredient(ingredients) {
        return Err("Several ingredients are named as fragrance; flag the oil");
    }
    Ok(())
}

// ============================================================================
// Billing Validations
// ============================================================================

/// Validate an invoice number (non-blank, at most 64 characters)
pub fn validate_invoice_number(invoice: &str) -> Result<(), &'static str> {
    let trimmed = invoice.trim();
    if trimmed.is_empty() {
        return Err("Invoice number is required");
    }
    if trimmed.chars().count() > 64 {
        return Err("Invoice number must be at most 64 characters");
    }
    Ok(())
}
