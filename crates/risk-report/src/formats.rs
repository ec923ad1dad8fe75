//! Report format selection and the per-record writer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::html::HtmlReporter;
use crate::json::JsonReporter;
use crate::record::{RecordReport, RecordReporter, sanitize_id};
use crate::xlsx::XlsxReporter;

/// Which report files are written for each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportFormats {
    pub xlsx: bool,
    pub html: bool,
    pub json: bool,
}

impl Default for ReportFormats {
    /// Spreadsheet and HTML, as produced historically.
    fn default() -> Self {
        Self {
            xlsx: true,
            html: true,
            json: false,
        }
    }
}

impl ReportFormats {
    pub fn all() -> Self {
        Self {
            xlsx: true,
            html: true,
            json: true,
        }
    }

    pub fn none() -> Self {
        Self {
            xlsx: false,
            html: false,
            json: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.xlsx || self.html || self.json)
    }

    pub fn reporters(&self) -> Vec<Box<dyn RecordReporter>> {
        let mut reporters: Vec<Box<dyn RecordReporter>> = Vec::new();
        if self.xlsx {
            reporters.push(Box::new(XlsxReporter));
        }
        if self.html {
            reporters.push(Box::new(HtmlReporter));
        }
        if self.json {
            reporters.push(Box::new(JsonReporter));
        }
        reporters
    }
}

/// Writes the selected reports for each record into one directory.
///
/// Every record gets its own file names: when an id maps to a name already
/// used in this run, the record's row number is appended (`patient_p_1_4`).
/// Names are compared case-insensitively.
pub struct ReportWriter {
    out_dir: PathBuf,
    reporters: Vec<Box<dyn RecordReporter>>,
    stems: HashSet<String>,
}

impl std::fmt::Debug for ReportWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let extensions: Vec<&str> = self.reporters.iter().map(|r| r.extension()).collect();
        f.debug_struct("ReportWriter")
            .field("out_dir", &self.out_dir)
            .field("reporters", &extensions)
            .field("records", &self.stems.len())
            .finish()
    }
}

impl ReportWriter {
    /// Creates `out_dir` if needed.
    pub fn create(out_dir: &Path, formats: ReportFormats) -> Result<Self> {
        std::fs::create_dir_all(out_dir).map_err(|source| ReportError::io(out_dir, source))?;
        Ok(Self::with_reporters(out_dir, formats.reporters()))
    }

    pub fn with_reporters(out_dir: &Path, reporters: Vec<Box<dyn RecordReporter>>) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            reporters,
            stems: HashSet::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }

    /// Writes every report for one record, stopping at the first failure.
    /// Returns the written paths.
    pub fn write(&mut self, report: &RecordReport<'_>) -> Result<Vec<PathBuf>> {
        if self.reporters.is_empty() {
            return Ok(Vec::new());
        }
        let stem = self.claim_stem(report);
        let mut written = Vec::with_capacity(self.reporters.len());
        for reporter in &self.reporters {
            let path = reporter.path_for(&self.out_dir, &stem);
            reporter.write(report, &path)?;
            debug!(record = report.record_id(), path = %path.display(), "report written");
            written.push(path);
        }
        Ok(written)
    }

    fn claim_stem(&mut self, report: &RecordReport<'_>) -> String {
        let base = sanitize_id(report.record_id());
        let mut stem = base.clone();
        let mut suffix = report.record.row();
        while !self.stems.insert(stem.to_lowercase()) {
            stem = format!("{base}_{suffix}");
            suffix += 1;
        }
        if stem != base {
            debug!(record = report.record_id(), file_stem = %stem, "report name already taken");
        }
        stem
    }
}
