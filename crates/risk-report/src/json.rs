//! JSON report.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use risk_model::{CellValue, MissReason, OrderedMap};

use crate::error::{ReportError, Result};
use crate::record::{RecordReport, RecordReporter, generated_at};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl RecordReporter for JsonReporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write(&self, report: &RecordReport<'_>, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| ReportError::io(path, source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &JsonDocument::from(report)).map_err(
            |source| ReportError::Json {
                path: path.to_path_buf(),
                source,
            },
        )?;
        std::io::Write::flush(&mut writer).map_err(|source| ReportError::io(path, source))
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    patient_id: &'a str,
    generated_at: String,
    raw: RawValues<'a>,
    computed: &'a OrderedMap<f64>,
    missed: OrderedMap<Vec<String>>,
    /// Formula failure messages by score.
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    errors: OrderedMap<String>,
}

impl<'a> From<&RecordReport<'a>> for JsonDocument<'a> {
    fn from(report: &RecordReport<'a>) -> Self {
        let errors = report
            .scores
            .missed()
            .iter()
            .filter_map(|(name, reason)| match reason {
                MissReason::FormulaError { message } => {
                    Some((name.to_string(), message.clone()))
                }
                MissReason::MissingVariables { .. } => None,
            })
            .collect();
        Self {
            patient_id: report.record_id(),
            generated_at: generated_at(),
            raw: RawValues(*report),
            computed: report.computed(),
            missed: report
                .missed()
                .map(|(name, reasons)| (name.to_string(), reasons))
                .collect(),
            errors,
        }
    }
}

/// Raw values as plain JSON scalars; missing cells are `null`.
struct RawValues<'a>(RecordReport<'a>);

impl Serialize for RawValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (label, cell) in self.0.raw() {
            match cell {
                CellValue::Number(value) if value.is_finite() => map.serialize_entry(label, value)?,
                CellValue::Text(text) => map.serialize_entry(label, text)?,
                _ => map.serialize_entry(label, &())?,
            }
        }
        map.end()
    }
}
