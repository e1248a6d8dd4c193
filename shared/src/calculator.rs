//! Blending formula calculator
//!
//! Turns a percentage formula plus a resolved [`Calculation`] into
//! per-ingredient masses and a total batch mass. Every run is a full
//! recomputation; nothing from a previous result is reused.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Calculation, Ingredient};
use crate::types::{format_fixed, round_fixed};

/// Decimal places kept for masses
pub const GRAMS_DP: u32 = 2;

/// Largest total batch mass the store can hold (16 integer digits, 2 places)
pub fn max_total_grams() -> Decimal {
    Decimal::new(999_999_999_999_999_999, GRAMS_DP)
}

/// Reasons a calculation produces no result
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must be a positive number")]
    InvalidField { field: &'static str },

    #[error("unit count must be at least 1")]
    InvalidUnitCount,

    #[error("no fragrance/oil ingredient found in the formula")]
    NoOilIngredient,

    #[error("more than one ingredient could be the oil")]
    AmbiguousOilIngredient,

    #[error("oil ingredient '{name}' has no percentage")]
    ZeroOilPercentage { name: String },

    #[error("the formula has no ingredients")]
    EmptyFormula,

    #[error("calculated mass is out of range")]
    OutOfRange,
}

/// Output of a calculator run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedFormula {
    pub ingredients: Vec<Ingredient>,
    pub total_grams: Decimal,
}

impl CalculatedFormula {
    /// Total mass as persisted: two-decimal text
    pub fn total_display(&self) -> String {
        format_fixed(self.total_grams, GRAMS_DP)
    }
}

fn single<'a>(
    mut candidates: impl Iterator<Item = &'a Ingredient>,
) -> Result<Option<&'a Ingredient>, CalcError> {
    match (candidates.next(), candidates.next()) {
        (Some(_), Some(_)) => Err(CalcError::AmbiguousOilIngredient),
        (found, _) => Ok(found),
    }
}

/// Locate the one ingredient whose mass fragrance mode targets. An explicit
/// `is_oil` flag wins over a name match; two candidates at the same level
/// are ambiguous.
pub fn find_oil_ingredient(ingredients: &[Ingredient]) -> Result<&Ingredient, CalcError> {
    if let Some(oil) = single(ingredients.iter().filter(|i| i.is_oil))? {
        return Ok(oil);
    }
    single(ingredients.iter().filter(|i| i.is_fragrance()))?.ok_or(CalcError::NoOilIngredient)
}

fn percent_of(total: Decimal, percentage: Decimal) -> Result<Decimal, CalcError> {
    total
        .checked_mul(percentage)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(CalcError::OutOfRange)
}

/// Unrounded total batch mass for the given mode
pub fn total_grams(
    ingredients: &[Ingredient],
    calculation: &Calculation,
    unit_count: Option<u32>,
) -> Result<Decimal, CalcError> {
    match calculation {
        Calculation::Auto {
            fill_weight,
            fill_unit,
            error_margin,
        } => {
            let units = match unit_count {
                None => 1,
                Some(0) => return Err(CalcError::InvalidUnitCount),
                Some(n) => n,
            };
            let base = Decimal::from(units)
                .checked_mul(*fill_weight)
                .and_then(|v| v.checked_mul(fill_unit.grams_per_unit()))
                .ok_or(CalcError::OutOfRange)?;
            let overage = Decimal::ONE + *error_margin / Decimal::ONE_HUNDRED;
            base.checked_mul(overage).ok_or(CalcError::OutOfRange)
        }
        Calculation::Fragrance { fragrance_grams } => {
            let oil = find_oil_ingredient(ingredients)?;
            if oil.percentage <= Decimal::ZERO {
                return Err(CalcError::ZeroOilPercentage {
                    name: oil.name.clone(),
                });
            }
            fragrance_grams
                .checked_mul(Decimal::ONE_HUNDRED)
                .and_then(|v| v.checked_div(oil.percentage))
                .ok_or(CalcError::OutOfRange)
        }
        Calculation::Override { override_grams } => Ok(*override_grams),
    }
}

/// Compute per-ingredient masses. Percentages need not sum to 100 here.
pub fn calculate(
    ingredients: &[Ingredient],
    calculation: &Calculation,
    unit_count: Option<u32>,
) -> Result<CalculatedFormula, CalcError> {
    if ingredients.is_empty() {
        return Err(CalcError::EmptyFormula);
    }

    let total = total_grams(ingredients, calculation, unit_count)?;
    let total_rounded = round_fixed(total, GRAMS_DP);
    if total_rounded > max_total_grams() {
        return Err(CalcError::OutOfRange);
    }

    let calculated = ingredients
        .iter()
        .map(|ingredient| {
            let grams = percent_of(total, ingredient.percentage)?;
            Ok(Ingredient {
                calculated_grams: Some(round_fixed(grams, GRAMS_DP)),
                ..ingredient.as_template()
            })
        })
        .collect::<Result<Vec<_>, CalcError>>()?;

    Ok(CalculatedFormula {
        ingredients: calculated,
        total_grams: total_rounded,
    })
}
