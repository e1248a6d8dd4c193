//! Renderers for a [`FormulaReport`]: spreadsheet sheet model, HTML email
//! body and plain-text print view. None of them formats numbers on its own;
//! they only lay out the strings and rounded values the report carries.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::GRAMS_DP;
use crate::report::{FormulaReport, ReportRow, PERCENT_DP};
use crate::types::format_fixed;
use crate::units::GALLONS_DP;

/// Column headings shared by every target
pub const COLUMNS: [&str; 4] = ["Ingredient", "Percentage", "Grams", "Gallons"];

/// Background used for highlighted fragrance cells
pub const HIGHLIGHT_COLOR: &str = "#FFF59D";

/// Spreadsheet sheet names are capped at 31 characters
const MAX_SHEET_NAME: usize = 31;

// ============================================================================
// Spreadsheet
// ============================================================================

/// Number formats applied to numeric cells
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// 0-1 fraction shown as a percentage
    Percent,
    Grams,
    Gallons,
}

impl NumberFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            NumberFormat::Percent => "0.00%",
            NumberFormat::Grams => "0.00",
            NumberFormat::Gallons => "0.0000",
        }
    }
}

/// One spreadsheet cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SheetCell {
    Text { value: String },
    Number { value: Decimal, format: NumberFormat },
}

impl SheetCell {
    fn text(value: impl Into<String>) -> Self {
        SheetCell::Text {
            value: value.into(),
        }
    }

    /// What a spreadsheet application shows for this cell
    pub fn display(&self) -> String {
        match self {
            SheetCell::Text { value } => value.clone(),
            SheetCell::Number { value, format } => match format {
                NumberFormat::Percent => {
                    format!("{}%", format_fixed(*value * Decimal::ONE_HUNDRED, PERCENT_DP))
                }
                NumberFormat::Grams => format_fixed(*value, GRAMS_DP),
                NumberFormat::Gallons => format_fixed(*value, GALLONS_DP),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetRow {
    pub cells: Vec<SheetCell>,
    pub highlight: bool,
    pub bold: bool,
}

/// A single worksheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<SheetRow>,
}

fn sheet_row(row: &ReportRow, bold: bool) -> SheetRow {
    let grams = match row.grams {
        Some(value) => SheetCell::Number {
            value,
            format: NumberFormat::Grams,
        },
        None => SheetCell::text(row.grams_display.clone()),
    };
    let gallons = match row.gallons {
        Some(value) => SheetCell::Number {
            value,
            format: NumberFormat::Gallons,
        },
        None => SheetCell::text(row.gallons_display.clone()),
    };

    SheetRow {
        cells: vec![
            SheetCell::text(row.name.clone()),
            SheetCell::Number {
                value: row.percentage / Decimal::ONE_HUNDRED,
                format: NumberFormat::Percent,
            },
            grams,
            gallons,
        ],
        highlight: row.highlight,
        bold,
    }
}

fn sheet_name(project_name: &str) -> String {
    let cleaned: String = project_name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => ' ',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "Formula".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lay the report out as a worksheet
pub fn to_sheet(report: &FormulaReport) -> Sheet {
    let mut rows: Vec<SheetRow> = report.rows.iter().map(|r| sheet_row(r, false)).collect();
    rows.push(sheet_row(&report.total_row, true));

    Sheet {
        name: sheet_name(&report.project_name),
        header: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

// ============================================================================
// HTML
// ============================================================================

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn html_row(out: &mut String, row: &ReportRow, cell_tag: &str) {
    let style = if row.highlight {
        format!(r#" style="background-color:{}""#, HIGHLIGHT_COLOR)
    } else {
        String::new()
    };
    out.push_str("<tr>");
    for value in [
        &row.name,
        &row.percentage_display,
        &row.grams_display,
        &row.gallons_display,
    ] {
        let _ = write!(out, "<{tag}{style}>{}</{tag}>", escape_html(value), tag = cell_tag);
    }
    out.push_str("</tr>\n");
}

/// HTML table used as the notification email body
pub fn render_html(report: &FormulaReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<h2>{} &ndash; {}</h2>",
        escape_html(&report.company_name),
        escape_html(&report.project_name)
    );
    out.push_str(
        "<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\" style=\"border-collapse:collapse\">\n",
    );
    out.push_str("<thead><tr>");
    for column in COLUMNS {
        let _ = write!(out, "<th>{}</th>", column);
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &report.rows {
        html_row(&mut out, row, "td");
    }
    out.push_str("</tbody>\n<tfoot>\n");
    html_row(&mut out, &report.total_row, "th");
    out.push_str("</tfoot>\n</table>\n");
    out
}

// ============================================================================
// Print view
// ============================================================================

fn print_line(out: &mut String, widths: &[usize; 4], cells: [&str; 4]) {
    let _ = writeln!(
        out,
        "{:<w0$}  {:>w1$}  {:>w2$}  {:>w3$}",
        cells[0],
        cells[1],
        cells[2],
        cells[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3]
    );
}

fn print_name(row: &ReportRow) -> String {
    if row.highlight {
        format!("* {}", row.name)
    } else {
        row.name.clone()
    }
}

/// Plain-text table for the print view. Highlighted lines are starred.
pub fn render_print(report: &FormulaReport) -> String {
    let all_rows: Vec<&ReportRow> = report
        .rows
        .iter()
        .chain(std::iter::once(&report.total_row))
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &all_rows {
        widths[0] = widths[0].max(print_name(row).chars().count());
        widths[1] = widths[1].max(row.percentage_display.len());
        widths[2] = widths[2].max(row.grams_display.len());
        widths[3] = widths[3].max(row.gallons_display.len());
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", report.company_name, report.project_name);
    print_line(&mut out, &widths, COLUMNS);
    let _ = writeln!(out, "{}", "-".repeat(widths.iter().sum::<usize>() + 6));

    for row in all_rows {
        let name = print_name(row);
        print_line(
            &mut out,
            &widths,
            [
                name.as_str(),
                row.percentage_display.as_str(),
                row.grams_display.as_str(),
                row.gallons_display.as_str(),
            ],
        );
    }

    if report.rows.iter().any(|r| r.highlight) {
        out.push_str("\n* fragrance ingredient\n");
    }
    out
}
