//! Gallon equivalents for water and alcohol ingredients

use rust_decimal::Decimal;

use crate::types::{format_fixed, parse_decimal, round_fixed};

/// Decimal places kept for gallon figures
pub const GALLONS_DP: u32 = 4;

/// Placeholder shown when no conversion applies
pub const NOT_APPLICABLE: &str = "-";

/// Grams of water in one US gallon (unit density)
pub fn grams_per_gallon_water() -> Decimal {
    Decimal::new(378541, 2)
}

/// Empirical gallons-per-gram factor for B40 190 proof alcohol
pub fn gallons_per_gram_b40() -> Decimal {
    Decimal::new(335, 6)
}

/// Convert an ingredient mass to gallons, rounded to 4 places.
/// Returns `None` for ingredients without a known conversion.
pub fn gallons(ingredient_name: &str, grams: Decimal) -> Option<Decimal> {
    let name = ingredient_name.to_lowercase();
    let value = if name.contains("water") {
        grams.checked_div(grams_per_gallon_water())?
    } else if name.contains("b40") || name.contains("alcohol") {
        grams.checked_mul(gallons_per_gram_b40())?
    } else {
        return None;
    };
    Some(round_fixed(value, GALLONS_DP))
}

/// Display form used by every report: 4 decimals or "-"
pub fn gallons_display(ingredient_name: &str, grams: Option<Decimal>) -> String {
    grams
        .and_then(|g| gallons(ingredient_name, g))
        .map(|g| format_fixed(g, GALLONS_DP))
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

/// Same as [`gallons_display`] for a mass stored as text
pub fn gallons_display_text(ingredient_name: &str, grams: &str) -> String {
    gallons_display(ingredient_name, parse_decimal(grams))
}
