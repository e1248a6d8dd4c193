//! Fill size extraction from free text (SKU, project name, size field)
//!
//! The result only pre-populates a default fill weight. Operators can always
//! override it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::FillUnit;

static SIZE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(ml|oz|gallon|gal|g)").expect("Invalid size regex")
});

/// A declared fill quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedSize {
    /// Numeric text exactly as written
    pub weight: String,
    pub unit: FillUnit,
}

/// Find the first `<number><unit>` in `text`.
///
/// Grams are read as millilitres (unit density), which only holds for
/// water-like fills.
pub fn parse_size(text: &str) -> Option<ParsedSize> {
    let captures = SIZE_REGEX.captures(text)?;
    let weight = captures.get(1)?.as_str().to_string();
    let unit = match captures.get(2)?.as_str().to_lowercase().as_str() {
        "ml" | "g" => FillUnit::Ml,
        "oz" => FillUnit::Oz,
        _ => FillUnit::Gal,
    };
    Some(ParsedSize { weight, unit })
}

/// First size found across several free-text fields, in order
pub fn default_fill_from<'a, I>(sources: I) -> Option<ParsedSize>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    sources.into_iter().flatten().find_map(parse_size)
}
