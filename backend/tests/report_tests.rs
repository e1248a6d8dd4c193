//! Report formatting tests
//!
//! The spreadsheet, HTML email body and print view are all rendered from one
//! row model, so a batch shows the same numbers everywhere.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::render::{render_html, render_print, to_sheet, SheetCell};
use shared::{format_report, format_row, gallons_display, BatchNotification, FormulaReport, Ingredient};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn line(name: &str, percentage: &str, grams: Decimal) -> Ingredient {
    Ingredient {
        calculated_grams: Some(grams),
        ..Ingredient::new(name, dec(percentage))
    }
}

fn spray_report(b40: Decimal, water: Decimal, oil: Decimal) -> FormulaReport {
    format_report(&BatchNotification {
        company_name: "Acme Home".to_string(),
        project_name: "Linen Spray".to_string(),
        total_batch_grams: (b40 + water + oil).to_string(),
        calculated_ingredients: vec![
            line("B40 190 Proof", "40", b40),
            line("DI Water", "58", water),
            line("Fragrance Oil", "2", oil),
        ],
    })
}

/// Every rendered string of every row, total included
fn row_strings(report: &FormulaReport) -> Vec<[String; 4]> {
    report
        .rows
        .iter()
        .chain(std::iter::once(&report.total_row))
        .map(|r| {
            [
                r.name.clone(),
                r.percentage_display.clone(),
                r.grams_display.clone(),
                r.gallons_display.clone(),
            ]
        })
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_production_report_values() {
        let report = spray_report(dec("41200"), dec("59740"), dec("2060"));
        let rows = row_strings(&report);

        assert_eq!(rows[0], ["B40 190 Proof", "40.00%", "41200.00", "13.8020"].map(String::from));
        assert_eq!(rows[1], ["DI Water", "58.00%", "59740.00", "15.7816"].map(String::from));
        assert_eq!(rows[2], ["Fragrance Oil", "2.00%", "2060.00", "-"].map(String::from));
        assert_eq!(rows[3], ["Total", "100.00%", "103000.00", ""].map(String::from));
    }

    #[test]
    fn test_only_fragrance_rows_are_highlighted() {
        let report = spray_report(dec("1000"), dec("1450"), dec("50"));
        let flags: Vec<bool> = report.rows.iter().map(|r| r.highlight).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert!(!report.total_row.highlight);
    }

    #[test]
    fn test_alcohol_name_uses_b40_factor() {
        assert_eq!(gallons_display("Ethyl Alcohol", Some(dec("1000"))), "0.3350");
        assert_eq!(gallons_display("Glycerin", Some(dec("1000"))), "-");
        assert_eq!(gallons_display("Tap WATER", Some(dec("3785.41"))), "1.0000");
    }

    #[test]
    fn test_half_values_round_away_from_zero() {
        let row = format_row(&line("Fragrance Oil", "0.125", dec("10.005")));
        assert_eq!(row.percentage_display, "0.13%");
        assert_eq!(row.grams_display, "10.01");
    }

    #[test]
    fn test_all_targets_show_the_same_numbers() {
        let report = spray_report(dec("1000.005"), dec("1449.995"), dec("50"));
        let html = render_html(&report);
        let print = render_print(&report);
        let sheet = to_sheet(&report);

        for (strings, sheet_row) in row_strings(&report).iter().zip(&sheet.rows) {
            let shown: Vec<String> = sheet_row.cells.iter().map(SheetCell::display).collect();
            assert_eq!(shown, strings.to_vec());
            for value in strings.iter().filter(|v| !v.is_empty()) {
                assert!(html.contains(value.as_str()), "html is missing {}", value);
                assert!(print.contains(value.as_str()), "print view is missing {}", value);
            }
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Masses with up to four decimals, so rounding is exercised
    fn grams_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000_000i64).prop_map(|n| Decimal::new(n, 4))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The sheet displays exactly what the row model holds
        #[test]
        fn prop_sheet_matches_row_model(
            b40 in grams_strategy(),
            water in grams_strategy(),
            oil in grams_strategy()
        ) {
            let report = spray_report(b40, water, oil);
            let sheet = to_sheet(&report);

            prop_assert_eq!(sheet.rows.len(), report.rows.len() + 1);
            for (strings, sheet_row) in row_strings(&report).iter().zip(&sheet.rows) {
                let shown: Vec<String> = sheet_row.cells.iter().map(SheetCell::display).collect();
                prop_assert_eq!(shown, strings.to_vec());
            }
        }

        /// Gram figures always carry exactly two decimals, gallons four
        #[test]
        fn prop_fixed_decimal_places(
            b40 in grams_strategy(),
            water in grams_strategy(),
            oil in grams_strategy()
        ) {
            let report = spray_report(b40, water, oil);
            for row in &report.rows {
                let decimals = row.grams_display.split('.').nth(1).map(str::len);
                prop_assert_eq!(decimals, Some(2));
            }
            for row in &report.rows[..2] {
                let decimals = row.gallons_display.split('.').nth(1).map(str::len);
                prop_assert_eq!(decimals, Some(4));
            }
        }
    }
}
