//! Table orientation detection.
//!
//! Clinical sheets are sometimes authored with one variable per row and one
//! patient per column. The detector counts how many column labels look like
//! canonical variable names; too few means the variables are on the other
//! axis and the table is transposed.

use serde::Serialize;

use risk_model::Table;

use crate::fuzzy::{MatchOptions, extract_one};

/// Matching columns below this count trigger a transpose.
pub const MIN_MATCHING_COLUMNS: usize = 3;

/// A column label whose best canonical match reached the cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMatch {
    pub column: String,
    pub variable: String,
    pub score: u8,
}

/// Outcome of orientation detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrientationReport {
    /// Columns that matched a canonical variable, in column order.
    pub matched: Vec<ColumnMatch>,
    /// Total number of columns inspected.
    pub columns_checked: usize,
    /// Whether the table must be transposed.
    pub transpose: bool,
}

impl OrientationReport {
    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }
}

/// Scores every column label against the canonical variable names.
pub fn assess_orientation<S: AsRef<str>>(
    table: &Table,
    canonical: &[S],
    options: &MatchOptions,
) -> OrientationReport {
    let mut matched = Vec::new();
    for column in table.columns() {
        let Some(found) = extract_one(column, canonical.iter()) else {
            continue;
        };
        if found.score >= options.cutoff {
            matched.push(ColumnMatch {
                column: column.clone(),
                variable: found.candidate.to_string(),
                score: found.score,
            });
        }
    }
    let transpose = matched.len() < options.min_matching_columns;
    OrientationReport {
        matched,
        columns_checked: table.column_count(),
        transpose,
    }
}

/// Returns the table oriented with variables as columns, using default
/// matching options.
pub fn detect_orientation<S: AsRef<str>>(table: Table, canonical: &[S]) -> Table {
    detect_orientation_with(table, canonical, &MatchOptions::default()).0
}

/// Like [`detect_orientation`], also returning the detection report.
pub fn detect_orientation_with<S: AsRef<str>>(
    table: Table,
    canonical: &[S],
    options: &MatchOptions,
) -> (Table, OrientationReport) {
    let report = assess_orientation(&table, canonical, options);
    if report.transpose {
        (table.transpose(), report)
    } else {
        (table, report)
    }
}

#[cfg(test)]
mod tests {
    use risk_model::CellValue;

    use super::*;

    fn numbers(values: &[f64]) -> Vec<CellValue> {
        values.iter().copied().map(CellValue::Number).collect()
    }

    #[test]
    fn keeps_table_with_enough_matching_columns() {
        let table = Table::from_rows(
            vec!["Age".into(), "SBP".into(), "Heart Rate".into()],
            vec![numbers(&[60.0, 130.0, 72.0])],
        )
        .expect("table");
        let canonical = ["age", "sbp", "heart_rate", "creatinine"];
        let (oriented, report) =
            detect_orientation_with(table.clone(), &canonical, &MatchOptions::default());
        assert!(!report.transpose);
        assert_eq!(report.matched_count(), 3);
        assert_eq!(oriented, table);
    }

    #[test]
    fn small_dictionaries_always_transpose() {
        let table = Table::from_rows(
            vec!["age".into(), "sbp".into()],
            vec![numbers(&[60.0, 130.0])],
        )
        .expect("table");
        let report = assess_orientation(&table, &["age", "sbp"], &MatchOptions::default());
        assert_eq!(report.matched_count(), 2);
        assert!(report.transpose);
    }
}
