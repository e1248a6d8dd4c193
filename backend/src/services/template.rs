//! Formula template service
//!
//! Templates are percentage-only formulas that batches are started from.
//! They are validated once at creation and never edited afterwards.

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{FormulaTemplate, Ingredient, TemplateRow};
use shared::validation;

/// Formula template service
#[derive(Clone)]
pub struct FormulaTemplateService {
    db: PgPool,
}

/// Input for creating a template
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateInput {
    #[validate(length(min = 1, max = 255, message = "Template name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(max = 255, message = "Company name cannot exceed 255 characters"))]
    pub company_name: Option<String>,
    #[validate(length(min = 1, message = "A template needs at least one ingredient"))]
    pub ingredients: Vec<Ingredient>,
}

impl CreateTemplateInput {
    /// Every check a template must pass before it is stored
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;

        if self.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Template name is required".to_string(),
            });
        }

        let ingredient_error = |message: &str| AppError::Validation {
            field: "ingredients".to_string(),
            message: message.to_string(),
        };
        validation::validate_ingredient_names(&self.ingredients).map_err(ingredient_error)?;
        validation::validate_percentage_range(&self.ingredients).map_err(ingredient_error)?;
        validation::validate_single_oil(&self.ingredients).map_err(ingredient_error)?;
        validation::validate_template_percentages(&self.ingredients)?;
        Ok(())
    }
}

impl FormulaTemplateService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Validate and store a new template
    pub async fn create_template(&self, input: CreateTemplateInput) -> AppResult<FormulaTemplate> {
        input.check()?;

        let ingredients: Vec<Ingredient> =
            input.ingredients.iter().map(Ingredient::as_template).collect();

        let row = sqlx::query_as::<_, TemplateRow>(
            r#"
            INSERT INTO formula_templates (id, name, company_name, ingredients, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, company_name, ingredients, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.company_name.as_deref().map(str::trim))
        .bind(sqlx::types::Json(&ingredients))
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(template_id = %row.id, "Formula template created");
        Ok(row.into())
    }

    /// Get a template by ID
    pub async fn get_template(&self, template_id: Uuid) -> AppResult<FormulaTemplate> {
        let row = sqlx::query_as::<_, TemplateRow>(
            r#"
            SELECT id, name, company_name, ingredients, created_at
            FROM formula_templates
            WHERE id = $1
            "#,
        )
        .bind(template_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Formula template".to_string()))?;

        Ok(row.into())
    }

    /// List templates by name
    pub async fn list_templates(&self) -> AppResult<Vec<FormulaTemplate>> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            r#"
            SELECT id, name, company_name, ingredients, created_at
            FROM formula_templates
            ORDER BY name ASC, created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(FormulaTemplate::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(ingredients: Vec<Ingredient>) -> CreateTemplateInput {
        CreateTemplateInput {
            name: "Linen Spray".to_string(),
            company_name: None,
            ingredients,
        }
    }

    #[test]
    fn test_valid_template_passes() {
        let template = input(vec![
            Ingredient::new("B40 190 Proof", dec("40")),
            Ingredient::new("DI Water", dec("58")),
            Ingredient::oil("Fragrance Oil", dec("2")),
        ]);
        assert!(template.check().is_ok());
    }

    #[test]
    fn test_percentages_must_total_100() {
        let template = input(vec![
            Ingredient::new("DI Water", dec("58")),
            Ingredient::oil("Fragrance Oil", dec("2")),
        ]);
        match template.check() {
            Err(AppError::PercentageTotal(err)) => assert_eq!(err.actual_total, dec("60")),
            other => panic!("expected percentage error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_template_rejected() {
        assert!(matches!(
            input(vec![]).check(),
            Err(AppError::Validation { .. })
        ));

        let mut blank_name = input(vec![Ingredient::new("DI Water", dec("100"))]);
        blank_name.name = "   ".to_string();
        assert!(matches!(
            blank_name.check(),
            Err(AppError::Validation { field, .. }) if field == "name"
        ));
    }

    #[test]
    fn test_two_flagged_oils_rejected() {
        let template = input(vec![
            Ingredient::oil("Fragrance Oil A", dec("50")),
            Ingredient::oil("Fragrance Oil B", dec("50")),
        ]);
        assert!(matches!(
            template.check(),
            Err(AppError::Validation { field, .. }) if field == "ingredients"
        ));
    }
}
