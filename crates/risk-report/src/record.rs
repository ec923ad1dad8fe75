//! The per-record report contract.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use risk_model::{CellValue, OrderedMap, RecordScores, RecordView};

use crate::error::Result;

/// Everything a report shows for one record.
#[derive(Debug, Clone, Copy)]
pub struct RecordReport<'a> {
    pub record: RecordView<'a>,
    pub scores: &'a RecordScores,
}

impl<'a> RecordReport<'a> {
    pub fn new(record: RecordView<'a>, scores: &'a RecordScores) -> Self {
        Self { record, scores }
    }

    pub fn record_id(&self) -> &'a str {
        self.record.id()
    }

    /// Raw values in column order.
    pub fn raw(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + use<'a> {
        self.record.values()
    }

    pub fn computed(&self) -> &'a OrderedMap<f64> {
        self.scores.computed()
    }

    /// Missed scores with their flat reason lists.
    pub fn missed(&self) -> impl Iterator<Item = (&'a str, Vec<String>)> + use<'a> {
        self.scores
            .missed()
            .iter()
            .map(|(name, reason)| (name, reason.reasons()))
    }
}

/// Current UTC time as shown in report footers.
pub(crate) fn generated_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Writes one report file per record.
pub trait RecordReporter: Send + Sync {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn write(&self, report: &RecordReport<'_>, path: &Path) -> Result<()>;

    /// Target path for the report named `patient_<stem>` inside `out_dir`.
    fn path_for(&self, out_dir: &Path, stem: &str) -> PathBuf {
        out_dir.join(format!("{FILE_PREFIX}{stem}.{}", self.extension()))
    }
}

const FILE_PREFIX: &str = "patient_";

/// `patient_<id>.<extension>` with the id made safe for file names.
pub fn report_file_name(record_id: &str, extension: &str) -> String {
    format!("{FILE_PREFIX}{}.{extension}", sanitize_id(record_id))
}

/// Replaces path separators, characters reserved on common file systems and
/// control characters with `_`; letters in any script are kept. Leading dots
/// are replaced so ids never name hidden or parent paths.
pub fn sanitize_id(record_id: &str) -> String {
    let mut sanitized: String = record_id
        .trim()
        .chars()
        .map(|ch| if is_unsafe_in_file_name(ch) { '_' } else { ch })
        .collect();
    let dots = sanitized.len() - sanitized.trim_start_matches('.').len();
    if dots > 0 {
        sanitized.replace_range(..dots, &"_".repeat(dots));
    }
    if sanitized.is_empty() {
        sanitized.push('_');
    }
    sanitized
}

fn is_unsafe_in_file_name(ch: char) -> bool {
    ch.is_control() || matches!(ch, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*')
}
