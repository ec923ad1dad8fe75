#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// True for `Missing` and for numeric NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(value) => value.is_nan(),
            Self::Text(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) if !value.is_nan() => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Display form used by reports; missing cells render empty.
    pub fn display(&self) -> String {
        match self {
            Self::Number(value) if value.is_nan() => String::new(),
            Self::Number(value) => format_numeric(*value),
            Self::Text(text) => text.clone(),
            Self::Missing => String::new(),
        }
    }
}

/// Formats a float without a trailing `.0` or trailing fractional zeros.
pub fn format_numeric(value: f64) -> String {
    let text = format!("{value}");
    if text.contains('.') && !text.contains('e') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Rectangular table of records.
///
/// `index` holds one id per row (the record ids), `columns` one label per
/// column. Cells are stored row-major. Transposing swaps the two axes, which
/// is how a sheet authored with one patient per column is turned back into
/// one patient per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    index: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Creates an empty table with the given column labels.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            index: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from rows, using zero-based row numbers as record ids.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let index = (0..rows.len()).map(|i| i.to_string()).collect();
        Self::with_index(columns, index, rows)
    }

    /// Builds a table from rows with explicit record ids.
    pub fn with_index(
        columns: Vec<String>,
        index: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        if index.len() != rows.len() {
            return Err(ModelError::IndexLength {
                expected: rows.len(),
                actual: index.len(),
            });
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(ModelError::RowWidth {
                    row,
                    expected: columns.len(),
                    actual: cells.len(),
                });
            }
        }
        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    pub fn push_row(&mut self, id: impl Into<String>, cells: Vec<CellValue>) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(ModelError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        self.index.push(id.into());
        self.rows.push(cells);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column carrying `label`.
    pub fn column_position(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == label)
    }

    pub fn record(&self, row: usize) -> Option<RecordView<'_>> {
        let cells = self.rows.get(row)?;
        Some(RecordView {
            row,
            id: &self.index[row],
            columns: &self.columns,
            cells,
        })
    }

    pub fn records(&self) -> impl ExactSizeIterator<Item = RecordView<'_>> {
        self.rows
            .iter()
            .zip(&self.index)
            .enumerate()
            .map(|(row, (cells, id))| RecordView {
                row,
                id,
                columns: &self.columns,
                cells,
            })
    }

    /// Swaps rows and columns: record ids become column labels and the
    /// former column labels become record ids.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let rows = (0..self.columns.len())
            .map(|col| self.rows.iter().map(|row| row[col].clone()).collect())
            .collect();
        Self {
            columns: self.index.clone(),
            index: self.columns.clone(),
            rows,
        }
    }
}

/// Borrowed view of one record.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    row: usize,
    id: &'a str,
    columns: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> RecordView<'a> {
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// Zero-based position of the record in its table.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Value under the first column labelled `label`, if the column exists.
    pub fn get(&self, label: &str) -> Option<&'a CellValue> {
        let position = self.columns.iter().position(|column| column == label)?;
        self.cells.get(position)
    }

    /// Value under `label`, treating NaN and absent columns as missing.
    pub fn present(&self, label: &str) -> Option<&'a CellValue> {
        self.get(label).filter(|value| !value.is_missing())
    }

    pub fn values(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + use<'a> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn transpose_swaps_index_and_columns() {
        let table = Table::with_index(
            labels(&["p1", "p2"]),
            labels(&["age", "weight"]),
            vec![
                vec![CellValue::Number(60.0), CellValue::Number(71.0)],
                vec![CellValue::Number(80.5), CellValue::Missing],
            ],
        )
        .expect("valid table");

        let flipped = table.transpose();
        assert_eq!(flipped.columns(), labels(&["age", "weight"]).as_slice());
        assert_eq!(flipped.index(), labels(&["p1", "p2"]).as_slice());
        let p2 = flipped.record(1).expect("second record");
        assert_eq!(p2.id(), "p2");
        assert_eq!(p2.get("age"), Some(&CellValue::Number(71.0)));
        assert!(p2.present("weight").is_none());
        assert_eq!(flipped.transpose(), table);
    }

    #[test]
    fn rejects_ragged_rows() {
        let error = Table::from_rows(labels(&["a", "b"]), vec![vec![CellValue::Missing]])
            .expect_err("ragged row");
        assert!(matches!(
            error,
            ModelError::RowWidth {
                row: 0,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn duplicate_labels_resolve_to_first_column() {
        let table = Table::from_rows(
            labels(&["Age", "Age"]),
            vec![vec![CellValue::Number(1.0), CellValue::Number(2.0)]],
        )
        .expect("valid table");
        let record = table.record(0).expect("record");
        assert_eq!(record.get("Age"), Some(&CellValue::Number(1.0)));
    }

    #[test]
    fn numeric_display_drops_trailing_zeros() {
        assert_eq!(format_numeric(60.0), "60");
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(1.25), "1.25");
        assert_eq!(CellValue::Number(f64::NAN).display(), "");
        assert!(CellValue::Number(f64::NAN).is_missing());
    }
}
