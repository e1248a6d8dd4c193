//! Formula ingredient models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::lenient_decimal;

/// One line of a blending formula
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    /// Share of the batch in percent (0-100), not a fraction
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub percentage: Decimal,
    /// Marks the batch's target active component
    #[serde(default)]
    pub is_oil: bool,
    /// Mass in grams, present only on calculated ingredient lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_grams: Option<Decimal>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            name: name.into(),
            percentage,
            is_oil: false,
            calculated_grams: None,
        }
    }

    pub fn oil(name: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            is_oil: true,
            ..Self::new(name, percentage)
        }
    }

    /// Fragrance lines get visual emphasis in every rendering
    pub fn is_fragrance(&self) -> bool {
        self.name.to_lowercase().contains("fragrance")
    }

    /// The template form of this line, without any derived mass
    pub fn as_template(&self) -> Self {
        Self {
            calculated_grams: None,
            ..self.clone()
        }
    }
}

/// Sum of percentages across a formula
pub fn total_percentage(ingredients: &[Ingredient]) -> Decimal {
    ingredients.iter().map(|i| i.percentage).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fragrance_case_insensitive() {
        assert!(Ingredient::new("Fragrance Oil", Decimal::from(2)).is_fragrance());
        assert!(Ingredient::new("LAVENDER FRAGRANCE", Decimal::from(2)).is_fragrance());
        assert!(!Ingredient::new("DI Water", Decimal::from(58)).is_fragrance());
    }

    #[test]
    fn test_deserialize_from_store_document() {
        let json = r#"[
            {"name": "B40 190 Proof", "percentage": 40},
            {"name": "DI Water", "percentage": "58"},
            {"name": "Fragrance Oil", "percentage": 2, "isOil": true},
            {"name": "Colorant", "percentage": ""}
        ]"#;
        let ingredients: Vec<Ingredient> = serde_json::from_str(json).unwrap();

        assert_eq!(ingredients.len(), 4);
        assert!(ingredients[2].is_oil);
        assert!(!ingredients[0].is_oil);
        assert_eq!(ingredients[3].percentage, Decimal::ZERO);
        assert_eq!(total_percentage(&ingredients), Decimal::from(100));
    }

    #[test]
    fn test_as_template_drops_mass() {
        let mut line = Ingredient::oil("Fragrance Oil", Decimal::from(2));
        line.calculated_grams = Some(Decimal::from(50));

        let template = line.as_template();
        assert_eq!(template.calculated_grams, None);
        assert!(template.is_oil);
    }
}
