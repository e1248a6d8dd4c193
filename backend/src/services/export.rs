//! Spreadsheet export service
//!
//! Encodes the report's sheet model as an XLSX workbook (fragrance rows
//! filled, percentages stored as fractions) or as plain CSV, and optionally
//! uploads the workbook to the document library under
//! `<company>/<project>/<file>`.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};
use shared::render::{to_sheet, Sheet, SheetCell, SheetRow, HIGHLIGHT_COLOR};
use shared::FormulaReport;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::DocumentLibraryClient;
use crate::services::notification::DeliveryOutcome;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const NAME_COLUMN_WIDTH: f64 = 30.0;

/// Export service
#[derive(Clone)]
pub struct ExportService {
    library: Option<DocumentLibraryClient>,
}

/// How one cell is written to the workbook
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub num_format: Option<&'static str>,
    /// RGB fill
    pub fill: Option<u32>,
    pub bold: bool,
}

fn highlight_rgb() -> Option<u32> {
    u32::from_str_radix(HIGHLIGHT_COLOR.trim_start_matches('#'), 16).ok()
}

pub fn cell_style(row: &SheetRow, cell: &SheetCell) -> CellStyle {
    CellStyle {
        num_format: match cell {
            SheetCell::Number { format, .. } => Some(format.pattern()),
            SheetCell::Text { .. } => None,
        },
        fill: if row.highlight { highlight_rgb() } else { None },
        bold: row.bold,
    }
}

fn xlsx_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if let Some(pattern) = style.num_format {
        format = format.set_num_format(pattern);
    }
    if let Some(rgb) = style.fill {
        format = format.set_background_color(Color::RGB(rgb));
    }
    if style.bold {
        format = format.set_bold();
    }
    format
}

fn xlsx_error(e: XlsxError) -> AppError {
    AppError::Internal(format!("Workbook serialization error: {}", e))
}

/// Encode a sheet as an XLSX workbook
pub fn encode_xlsx(sheet: &Sheet) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name).map_err(xlsx_error)?;
    worksheet
        .set_column_width(0, NAME_COLUMN_WIDTH)
        .map_err(xlsx_error)?;

    let header_format = Format::new().set_bold();
    for (col, title) in sheet.header.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, title.as_str(), &header_format)
            .map_err(xlsx_error)?;
    }

    for (i, row) in sheet.rows.iter().enumerate() {
        let row_num = (i + 1) as u32;
        for (col, cell) in row.cells.iter().enumerate() {
            let format = xlsx_format(&cell_style(row, cell));
            let col = col as u16;
            match cell {
                SheetCell::Text { value } => {
                    worksheet.write_string_with_format(row_num, col, value.as_str(), &format)
                }
                SheetCell::Number { value, .. } => {
                    let number = value.to_f64().ok_or_else(|| {
                        AppError::Internal(format!("Value {} cannot be written to a workbook", value))
                    })?;
                    worksheet.write_number_with_format(row_num, col, number, &format)
                }
            }
            .map_err(xlsx_error)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

/// Encode a sheet as CSV using the values a spreadsheet would display
pub fn encode_csv(sheet: &Sheet) -> AppResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&sheet.header)
        .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    for row in &sheet.rows {
        wtr.write_record(row.cells.iter().map(|cell| cell.display()))
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    wtr.into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))
}

/// Make a company or project name safe to use as a path segment
pub fn sanitize_segment(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "Untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name for an exported workbook
pub fn export_file_name(report: &FormulaReport) -> String {
    format!("{}.xlsx", sanitize_segment(&report.project_name))
}

/// File name for the CSV download
pub fn csv_file_name(report: &FormulaReport) -> String {
    format!("{}.csv", sanitize_segment(&report.project_name))
}

/// Library path for an exported report
pub fn library_path(report: &FormulaReport) -> String {
    format!(
        "{}/{}/{}",
        sanitize_segment(&report.company_name),
        sanitize_segment(&report.project_name),
        export_file_name(report)
    )
}

impl ExportService {
    pub fn new(config: &Config) -> Self {
        Self {
            library: config.export.as_ref().map(DocumentLibraryClient::new),
        }
    }

    /// Workbook bytes for a report
    pub fn spreadsheet(&self, report: &FormulaReport) -> AppResult<Vec<u8>> {
        encode_xlsx(&to_sheet(report))
    }

    /// Upload the report's spreadsheet. Failures are reported, not raised.
    pub async fn upload_report(&self, report: &FormulaReport) -> DeliveryOutcome {
        let Some(library) = &self.library else {
            return DeliveryOutcome::Skipped {
                reason: "document library is not configured".to_string(),
            };
        };

        let body = match self.spreadsheet(report) {
            Ok(body) => body,
            Err(e) => return DeliveryOutcome::Failed { error: e.to_string() },
        };

        match library
            .upload(&library_path(report), XLSX_CONTENT_TYPE, body)
            .await
        {
            Ok(url) => {
                tracing::info!(url = %url, "Formula spreadsheet uploaded");
                DeliveryOutcome::Sent { reference: Some(url) }
            }
            Err(e) => {
                tracing::warn!("Formula spreadsheet upload failed: {}", e);
                DeliveryOutcome::Failed { error: e.to_string() }
            }
        }
    }
}
