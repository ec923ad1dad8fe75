//! Diagnostics collected while scoring records.
//!
//! The engine never logs on its own behalf for per-record problems; it hands
//! them back here so the caller decides where they go.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub record_id: Option<String>,
    pub score: Option<String>,
    pub message: String,
}

/// Ordered diagnostic channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Records a warning about one score of one record.
    pub fn warn_score(&mut self, record_id: &str, score: &str, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            record_id: Some(record_id.to_string()),
            score: Some(score.to_string()),
            message: message.into(),
        });
    }

    /// Records an informational note about one score of one record.
    pub fn note_score(&mut self, record_id: &str, score: &str, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Info,
            record_id: Some(record_id.to_string()),
            score: Some(score.to_string()),
            message: message.into(),
        });
    }

    /// Appends `other`, keeping its order.
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
