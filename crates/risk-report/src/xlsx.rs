//! Spreadsheet report: `Raw`, `Scores` and `Missed` sheets.

use std::path::Path;

use rust_xlsxwriter::{
    Color, ConditionalFormatCell, ConditionalFormatCellRule, Format, Workbook, Worksheet,
    XlsxError,
};

use risk_model::CellValue;

use crate::error::{ReportError, Result};
use crate::record::{RecordReport, RecordReporter};

/// Font colour applied to positive score values.
const POSITIVE_COLOR: u32 = 0x0000FF;

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReporter;

impl RecordReporter for XlsxReporter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, report: &RecordReport<'_>, path: &Path) -> Result<()> {
        let mut workbook = build_workbook(report).map_err(|source| ReportError::Xlsx {
            path: path.to_path_buf(),
            source,
        })?;
        workbook.save(path).map_err(|source| ReportError::Xlsx {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn build_workbook(report: &RecordReport<'_>) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let raw = workbook.add_worksheet().set_name("Raw")?;
    write_header(raw, &["variable", report.record_id()], &header)?;
    for (idx, (label, cell)) in report.raw().enumerate() {
        let row = row_number(idx + 1)?;
        raw.write_string(row, 0, label)?;
        match cell {
            CellValue::Number(value) if value.is_finite() => {
                raw.write_number(row, 1, *value)?;
            }
            CellValue::Text(text) => {
                raw.write_string(row, 1, text)?;
            }
            _ => {}
        }
    }
    raw.set_column_width(0, 24)?;

    let scores = workbook.add_worksheet().set_name("Scores")?;
    write_header(scores, &["score", "value"], &header)?;
    let computed = report.computed();
    for (idx, (name, value)) in computed.iter().enumerate() {
        let row = row_number(idx + 1)?;
        scores.write_string(row, 0, name)?;
        scores.write_number(row, 1, *value)?;
    }
    let positive = ConditionalFormatCell::new()
        .set_rule(ConditionalFormatCellRule::GreaterThan(0))
        .set_format(Format::new().set_font_color(Color::RGB(POSITIVE_COLOR)));
    let last_row = row_number(computed.len().max(1))?;
    scores.add_conditional_format(1, 1, last_row, 1, &positive)?;
    scores.set_column_width(0, 24)?;

    let missed = workbook.add_worksheet().set_name("Missed")?;
    write_header(missed, &["score", "reasons"], &header)?;
    for (idx, (name, reasons)) in report.missed().enumerate() {
        let row = row_number(idx + 1)?;
        missed.write_string(row, 0, name)?;
        missed.write_string(row, 1, reasons.join(", "))?;
    }
    missed.set_column_width(0, 24)?;

    Ok(workbook)
}

fn write_header(
    sheet: &mut Worksheet,
    labels: &[&str],
    format: &Format,
) -> std::result::Result<(), XlsxError> {
    for (col, label) in labels.iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)?;
        sheet.write_string_with_format(0, col, *label, format)?;
    }
    Ok(())
}

fn row_number(idx: usize) -> std::result::Result<u32, XlsxError> {
    u32::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}
