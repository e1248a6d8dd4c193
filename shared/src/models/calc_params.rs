//! Calculation parameter models
//!
//! `CalcParams` is the form state an operator edits and that is saved with a
//! batch so the calculation can be re-opened. All fields survive mode
//! switches. `Calculation` is the resolved, mode-specific input the
//! calculator actually runs on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::CalcError;
use crate::types::{lenient_optional_decimal, BlendingSettings};

/// Selectable calculation modes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalcMode {
    /// Scale from fill size and unit count
    #[default]
    Auto,
    /// Scale from a target mass of the oil ingredient
    Fragrance,
    /// Use an operator-entered total mass
    Override,
}

impl CalcMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalcMode::Auto => "auto",
            CalcMode::Fragrance => "fragrance",
            CalcMode::Override => "override",
        }
    }
}

/// Fill units for a single finished unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FillUnit {
    #[default]
    Ml,
    Oz,
    Gal,
}

impl FillUnit {
    /// Grams per unit, assuming unit-density fluids
    pub fn grams_per_unit(&self) -> Decimal {
        match self {
            FillUnit::Ml => Decimal::ONE,
            FillUnit::Oz => Decimal::new(283495, 4),
            FillUnit::Gal => Decimal::new(378541, 2),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FillUnit::Ml => "ml",
            FillUnit::Oz => "oz",
            FillUnit::Gal => "gal",
        }
    }
}

impl std::fmt::Display for FillUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Saved calculation inputs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalcParams {
    #[serde(default)]
    pub mode: CalcMode,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    pub fill_weight: Option<Decimal>,
    #[serde(default)]
    pub fill_unit: FillUnit,
    /// Percent waste/overage; blank means the configured default
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    pub error_margin: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    pub fragrance_grams: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    pub override_grams: Option<Decimal>,
}

/// Resolved inputs for exactly one calculation mode
#[derive(Debug, Clone, PartialEq)]
pub enum Calculation {
    Auto {
        fill_weight: Decimal,
        fill_unit: FillUnit,
        error_margin: Decimal,
    },
    Fragrance {
        fragrance_grams: Decimal,
    },
    Override {
        override_grams: Decimal,
    },
}

impl Calculation {
    pub fn mode(&self) -> CalcMode {
        match self {
            Calculation::Auto { .. } => CalcMode::Auto,
            Calculation::Fragrance { .. } => CalcMode::Fragrance,
            Calculation::Override { .. } => CalcMode::Override,
        }
    }
}

fn require_positive(value: Option<Decimal>, field: &'static str) -> Result<Decimal, CalcError> {
    match value {
        None => Err(CalcError::MissingField { field }),
        Some(v) if v <= Decimal::ZERO => Err(CalcError::InvalidField { field }),
        Some(v) => Ok(v),
    }
}

impl CalcParams {
    /// Pick out the fields the active mode needs. Fields of inactive modes
    /// never reach the calculator.
    pub fn resolve(&self, settings: &BlendingSettings) -> Result<Calculation, CalcError> {
        match self.mode {
            CalcMode::Auto => {
                let fill_weight = require_positive(self.fill_weight, "fillWeight")?;
                let error_margin = self
                    .error_margin
                    .unwrap_or(*settings.error_margin_percent.effective());
                if error_margin < Decimal::ZERO {
                    return Err(CalcError::InvalidField {
                        field: "errorMargin",
                    });
                }
                Ok(Calculation::Auto {
                    fill_weight,
                    fill_unit: self.fill_unit,
                    error_margin,
                })
            }
            CalcMode::Fragrance => Ok(Calculation::Fragrance {
                fragrance_grams: require_positive(self.fragrance_grams, "fragranceGrams")?,
            }),
            CalcMode::Override => Ok(Calculation::Override {
                override_grams: require_positive(self.override_grams, "overrideGrams")?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_auto_uses_default_margin() {
        let params = CalcParams {
            fill_weight: Some(Decimal::from(100)),
            ..Default::default()
        };
        let calc = params.resolve(&BlendingSettings::default()).unwrap();
        assert_eq!(
            calc,
            Calculation::Auto {
                fill_weight: Decimal::from(100),
                fill_unit: FillUnit::Ml,
                error_margin: Decimal::from(3),
            }
        );
    }

    #[test]
    fn test_resolve_auto_explicit_zero_margin() {
        let params = CalcParams {
            fill_weight: Some(Decimal::from(8)),
            fill_unit: FillUnit::Oz,
            error_margin: Some(Decimal::ZERO),
            ..Default::default()
        };
        let calc = params.resolve(&BlendingSettings::default()).unwrap();
        assert!(matches!(calc, Calculation::Auto { error_margin, .. } if error_margin.is_zero()));
    }

    #[test]
    fn test_resolve_ignores_inactive_fields() {
        let params = CalcParams {
            mode: CalcMode::Override,
            fill_weight: None,
            fragrance_grams: Some(Decimal::from(50)),
            override_grams: Some(Decimal::from(1200)),
            ..Default::default()
        };
        let calc = params.resolve(&BlendingSettings::default()).unwrap();
        assert_eq!(
            calc,
            Calculation::Override {
                override_grams: Decimal::from(1200)
            }
        );
    }

    #[test]
    fn test_resolve_missing_fields() {
        let settings = BlendingSettings::default();

        let auto = CalcParams::default();
        assert_eq!(
            auto.resolve(&settings),
            Err(CalcError::MissingField { field: "fillWeight" })
        );

        let fragrance = CalcParams {
            mode: CalcMode::Fragrance,
            fill_weight: Some(Decimal::from(100)),
            ..Default::default()
        };
        assert_eq!(
            fragrance.resolve(&settings),
            Err(CalcError::MissingField {
                field: "fragranceGrams"
            })
        );
    }

    #[test]
    fn test_resolve_rejects_non_positive() {
        let params = CalcParams {
            mode: CalcMode::Override,
            override_grams: Some(Decimal::ZERO),
            ..Default::default()
        };
        assert_eq!(
            params.resolve(&BlendingSettings::default()),
            Err(CalcError::InvalidField {
                field: "overrideGrams"
            })
        );
    }

    #[test]
    fn test_form_state_deserialization() {
        let json = r#"{"mode": "auto", "fillWeight": "100", "fillUnit": "oz",
                       "errorMargin": "", "fragranceGrams": "abc"}"#;
        let params: CalcParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.fill_weight, Some(Decimal::from(100)));
        assert_eq!(params.fill_unit, FillUnit::Oz);
        assert_eq!(params.error_margin, None);
        assert_eq!(params.fragrance_grams, None);
    }

    #[test]
    fn test_grams_per_unit() {
        assert_eq!(FillUnit::Ml.grams_per_unit(), Decimal::ONE);
        assert_eq!(FillUnit::Oz.grams_per_unit().to_string(), "28.3495");
        assert_eq!(FillUnit::Gal.grams_per_unit().to_string(), "3785.41");
    }
}
