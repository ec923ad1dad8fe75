//! Observation table loading from CSV and spreadsheet files.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use risk_model::{CellValue, Table};

use crate::error::{IngestError, Result};

/// Cell texts read as missing values.
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A", "-",
];

/// Where record ids come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexColumn {
    /// First column when its header is blank, row numbers otherwise.
    #[default]
    Auto,
    /// The column with this header.
    Named(String),
    /// Zero-based row numbers.
    None,
}

impl IndexColumn {
    /// Parses a command-line value: `auto`, `none`, or a column header.
    pub fn from_arg(raw: &str) -> Self {
        match raw.trim() {
            "auto" | "" => Self::Auto,
            "none" => Self::None,
            other => Self::Named(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub index: IndexColumn,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            index: IndexColumn::Auto,
        }
    }
}

/// Trims a header and collapses inner whitespace.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classifies raw cell text as missing, numeric or text.
pub fn parse_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if MISSING_TOKENS.contains(&trimmed) {
        return CellValue::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => CellValue::Number(value),
        _ => CellValue::Text(trimmed.to_string()),
    }
}

/// Reads a table, choosing the reader by file extension.
pub fn read_table(path: &Path, options: &TableOptions) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" | "tsv" | "txt" => read_csv_table(path, options),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_excel_table(path, options),
        _ => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
            expected: "csv, tsv, txt, xlsx, xlsm, xlsb, xls or ods",
        }),
    }
}

pub fn read_csv_table(path: &Path, options: &TableOptions) -> Result<Table> {
    let is_tsv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    let delimiter = if is_tsv { b'\t' } else { b',' };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|source| csv_error(path, source))?;

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| csv_error(path, source))?;
        let row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    let mut rows = raw_rows.into_iter();
    let Some(header) = rows.next() else {
        return build_table(path, Vec::new(), Vec::new(), &options.index);
    };
    let headers: Vec<String> = header.iter().map(|value| normalize_header(value)).collect();
    let cells = rows
        .map(|row| {
            (0..headers.len())
                .map(|idx| row.get(idx).map_or(CellValue::Missing, |value| parse_cell(value)))
                .collect()
        })
        .collect();
    build_table(path, headers, cells, &options.index)
}

/// Reads the first worksheet of a spreadsheet.
pub fn read_excel_table(path: &Path, options: &TableOptions) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|source| IngestError::Excel {
        path: path.to_path_buf(),
        source,
    })?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let Some(first) = sheet_names.first() else {
        return Err(IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        });
    };
    debug!(path = %path.display(), sheet = %first, "reading worksheet");
    let range = workbook
        .worksheet_range(first)
        .map_err(|source| IngestError::Excel {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = range
        .rows()
        .filter(|row| !row.iter().all(|cell| excel_cell(cell).is_missing()));
    let Some(header) = rows.next() else {
        return build_table(path, Vec::new(), Vec::new(), &options.index);
    };
    let headers: Vec<String> = header
        .iter()
        .map(|cell| normalize_header(&excel_cell(cell).display()))
        .collect();
    let cells = rows
        .map(|row| {
            (0..headers.len())
                .map(|idx| row.get(idx).map_or(CellValue::Missing, excel_cell))
                .collect()
        })
        .collect();
    build_table(path, headers, cells, &options.index)
}

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => parse_cell(text),
        Data::Float(value) => CellValue::Number(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Bool(flag) => CellValue::Number(if *flag { 1.0 } else { 0.0 }),
        Data::DateTime(value) => CellValue::Number(value.as_f64()),
    }
}

fn csv_error(path: &Path, source: csv::Error) -> IngestError {
    IngestError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn build_table(
    path: &Path,
    mut headers: Vec<String>,
    mut rows: Vec<Vec<CellValue>>,
    index: &IndexColumn,
) -> Result<Table> {
    let index_position = match index {
        IndexColumn::Auto => headers.first().filter(|h| h.is_empty()).map(|_| 0),
        IndexColumn::Named(name) => {
            let wanted = normalize_header(name);
            let position = headers.iter().position(|header| *header == wanted);
            Some(position.ok_or_else(|| IngestError::IndexColumn {
                path: path.to_path_buf(),
                column: name.clone(),
            })?)
        }
        IndexColumn::None => None,
    };

    let ids: Vec<String> = match index_position {
        Some(position) => {
            headers.remove(position);
            rows.iter_mut()
                .enumerate()
                .map(|(row_number, row)| {
                    let id = row.remove(position).display();
                    if id.is_empty() { row_number.to_string() } else { id }
                })
                .collect()
        }
        None => (0..rows.len()).map(|row_number| row_number.to_string()).collect(),
    };
    debug!(
        path = %path.display(),
        rows = rows.len(),
        columns = headers.len(),
        "table loaded"
    );
    Table::with_index(headers, ids, rows).map_err(|source| IngestError::Table {
        path: path.to_path_buf(),
        source,
    })
}
