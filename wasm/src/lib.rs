//! WebAssembly module for the Blending Operations Suite
//!
//! Runs the blending engine in the browser so the batch form can show
//! calculated masses and the report preview before anything is saved:
//! - Formula calculation in all three modes
//! - Gallon equivalents
//! - Fill size detection
//! - Template percentage validation
//! - HTML and print renderings of a calculated batch

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::render::{render_html, render_print};
use shared::{calculate, format_report, gallons_display_text, parse_size};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("blending engine loaded"));
}

fn to_js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn calculate_json(
    ingredients_json: &str,
    params_json: &str,
    unit_count: Option<u32>,
    default_error_margin: Option<String>,
) -> Result<String, String> {
    let ingredients: Vec<Ingredient> = serde_json::from_str(ingredients_json)
        .map_err(|e| format!("Invalid ingredients JSON: {}", e))?;
    let params: CalcParams = serde_json::from_str(params_json)
        .map_err(|e| format!("Invalid calculation parameters JSON: {}", e))?;
    let settings = BlendingSettings::with_error_margin_override(
        default_error_margin.as_deref().and_then(parse_decimal),
    );

    let calculation = params.resolve(&settings).map_err(|e| e.to_string())?;
    let result = calculate(&ingredients, &calculation, unit_count).map_err(|e| e.to_string())?;
    serde_json::to_string(&result).map_err(|e| e.to_string())
}

fn template_check(ingredients_json: &str) -> Result<(), String> {
    let ingredients: Vec<Ingredient> = serde_json::from_str(ingredients_json)
        .map_err(|e| format!("Invalid ingredients JSON: {}", e))?;
    validate_template_percentages(&ingredients).map_err(|e| e.to_string())
}

fn report_from_json(batch_json: &str) -> Result<shared::FormulaReport, String> {
    let batch: BatchNotification = serde_json::from_str(batch_json)
        .map_err(|e| format!("Invalid batch JSON: {}", e))?;
    Ok(format_report(&batch))
}

/// Calculate masses for a formula.
///
/// Takes the ingredient list and saved calculation parameters as JSON and
/// returns `{ingredients, totalGrams}` as JSON.
#[wasm_bindgen]
pub fn calculate_formula(
    ingredients_json: &str,
    params_json: &str,
    unit_count: Option<u32>,
    default_error_margin: Option<String>,
) -> Result<String, JsValue> {
    calculate_json(ingredients_json, params_json, unit_count, default_error_margin)
        .map_err(to_js_error)
}

/// Gallon equivalent for an ingredient line, or "-"
#[wasm_bindgen]
pub fn format_gallons(ingredient_name: &str, grams: &str) -> String {
    gallons_display_text(ingredient_name, grams)
}

/// Detect a fill size in free text; returns `{weight, unit}` as JSON
#[wasm_bindgen]
pub fn parse_fill_size(text: &str) -> Option<String> {
    parse_size(text).and_then(|size| serde_json::to_string(&size).ok())
}

/// Check that template percentages total 100
#[wasm_bindgen]
pub fn validate_template(ingredients_json: &str) -> Result<(), JsValue> {
    template_check(ingredients_json).map_err(to_js_error)
}

/// HTML table for a calculated batch
#[wasm_bindgen]
pub fn render_formula_html(batch_json: &str) -> Result<String, JsValue> {
    report_from_json(batch_json)
        .map(|report| render_html(&report))
        .map_err(to_js_error)
}

/// Print view for a calculated batch
#[wasm_bindgen]
pub fn render_formula_print(batch_json: &str) -> Result<String, JsValue> {
    report_from_json(batch_json)
        .map(|report| render_print(&report))
        .map_err(to_js_error)
}
