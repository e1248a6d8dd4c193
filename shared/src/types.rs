//! Common types used across the suite

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de, Deserialize, Deserializer, Serialize};

/// A setting with a built-in default and an independently persisted override.
///
/// Clearing the override falls back to the default again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setting<T> {
    pub default: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_value: Option<T>,
}

impl<T> Setting<T> {
    pub fn new(default: T) -> Self {
        Self {
            default,
            override_value: None,
        }
    }

    pub fn with_override(mut self, value: Option<T>) -> Self {
        self.override_value = value;
        self
    }

    /// The value in force: the override if set, otherwise the default
    pub fn effective(&self) -> &T {
        self.override_value.as_ref().unwrap_or(&self.default)
    }

    pub fn set_override(&mut self, value: T) {
        self.override_value = Some(value);
    }

    pub fn clear_override(&mut self) {
        self.override_value = None;
    }
}

/// Default process waste/overage added to auto-mode batches, in percent
pub const DEFAULT_ERROR_MARGIN_PERCENT: i64 = 3;

/// Settings the calculator reads instead of ambient globals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlendingSettings {
    pub error_margin_percent: Setting<Decimal>,
}

impl Default for BlendingSettings {
    fn default() -> Self {
        Self {
            error_margin_percent: Setting::new(Decimal::from(DEFAULT_ERROR_MARGIN_PERCENT)),
        }
    }
}

impl BlendingSettings {
    pub fn with_error_margin_override(margin: Option<Decimal>) -> Self {
        Self {
            error_margin_percent: Setting::new(Decimal::from(DEFAULT_ERROR_MARGIN_PERCENT))
                .with_override(margin),
        }
    }
}

// ============================================================================
// Numeric helpers
// ============================================================================

/// Parse user-entered numeric text. Blank or malformed input yields `None`.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Round half away from zero. Every display path goes through this.
pub fn round_fixed(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(dp);
    rounded
}

/// Render a value with exactly `dp` decimal digits
pub fn format_fixed(value: Decimal, dp: u32) -> String {
    round_fixed(value, dp).to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(Decimal),
    Text(String),
}

/// Deserialize a number that may arrive as a JSON number, numeric text,
/// blank text or null. Blank and null count as zero.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LenientNumber>::deserialize(deserializer)? {
        None => Ok(Decimal::ZERO),
        Some(LenientNumber::Number(value)) => Ok(value),
        Some(LenientNumber::Text(text)) if text.trim().is_empty() => Ok(Decimal::ZERO),
        Some(LenientNumber::Text(text)) => parse_decimal(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid number: {}", text))),
    }
}

/// Deserialize an optional form field. Blank, null or non-numeric input is
/// treated as not filled in.
pub fn lenient_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LenientNumber>::deserialize(deserializer)? {
        None => None,
        Some(LenientNumber::Number(value)) => Some(value),
        Some(LenientNumber::Text(text)) => parse_decimal(&text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_setting_falls_back_to_default() {
        let mut setting = Setting::new(dec("3"));
        assert_eq!(*setting.effective(), dec("3"));

        setting.set_override(dec("5"));
        assert_eq!(*setting.effective(), dec("5"));

        setting.clear_override();
        assert_eq!(*setting.effective(), dec("3"));
    }

    #[test]
    fn test_default_error_margin() {
        let settings = BlendingSettings::default();
        assert_eq!(*settings.error_margin_percent.effective(), dec("3"));

        let settings = BlendingSettings::with_error_margin_override(Some(dec("1.5")));
        assert_eq!(*settings.error_margin_percent.effective(), dec("1.5"));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(" 3785.41 "), Some(dec("3785.41")));
        assert_eq!(parse_decimal("1e3"), Some(dec("1000")));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_format_fixed_rounds_half_away_from_zero() {
        assert_eq!(format_fixed(dec("0.005"), 2), "0.01");
        assert_eq!(format_fixed(dec("0.004999"), 2), "0.00");
        assert_eq!(format_fixed(dec("2.5"), 0), "3");
        assert_eq!(format_fixed(dec("-0.001"), 2), "0.00");
        assert_eq!(format_fixed(dec("41200"), 2), "41200.00");
        assert_eq!(format_fixed(dec("0.335"), 4), "0.3350");
    }

    #[derive(Deserialize)]
    struct FormFields {
        #[serde(default, deserialize_with = "lenient_decimal")]
        value: Decimal,
        #[serde(default, deserialize_with = "lenient_optional_decimal")]
        optional: Option<Decimal>,
    }

    #[test]
    fn test_lenient_deserialization() {
        let form: FormFields = serde_json::from_str(r#"{"value": "", "optional": "abc"}"#).unwrap();
        assert_eq!(form.value, Decimal::ZERO);
        assert_eq!(form.optional, None);

        let form: FormFields = serde_json::from_str(r#"{"value": 14.9, "optional": "100"}"#).unwrap();
        assert_eq!(form.value, dec("14.9"));
        assert_eq!(form.optional, Some(dec("100")));

        let form: FormFields = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(form.value, Decimal::ZERO);
        assert_eq!(form.optional, None);

        assert!(serde_json::from_str::<FormFields>(r#"{"value": "sixty"}"#).is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_round_fixed_is_within_half_unit(raw in -1_000_000_000i64..=1_000_000_000i64, dp in 0u32..=4) {
            let value = Decimal::new(raw, 5);
            let rounded = round_fixed(value, dp);
            let half_unit = Decimal::new(5, dp + 1);

            prop_assert!((rounded - value).abs() <= half_unit);
            prop_assert_eq!(rounded.scale(), dp);
        }

        #[test]
        fn prop_format_fixed_has_exact_places(raw in 0i64..=1_000_000_000i64) {
            let text = format_fixed(Decimal::new(raw, 3), 2);
            prop_assert_eq!(text.split('.').nth(1).map(str::len), Some(2));
            prop_assert_eq!(parse_decimal(&text), Some(round_fixed(Decimal::new(raw, 3), 2)));
        }
    }
}
