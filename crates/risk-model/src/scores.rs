//! Per-record score results.

use serde::{Deserialize, Serialize};

use crate::ordered::OrderedMap;

/// Reason placeholder reported for scores whose formula failed.
pub const FORMULA_ERROR: &str = "formula_error";

/// Why a score could not be computed for a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissReason {
    /// Required variables that were unbound or empty for the record.
    MissingVariables { variables: Vec<String> },
    /// The formula failed to compile or evaluate.
    FormulaError { message: String },
}

impl MissReason {
    /// Flat reason list: the missing variable names, or `["formula_error"]`.
    pub fn reasons(&self) -> Vec<String> {
        match self {
            Self::MissingVariables { variables } => variables.clone(),
            Self::FormulaError { .. } => vec![FORMULA_ERROR.to_string()],
        }
    }

    pub fn is_formula_error(&self) -> bool {
        matches!(self, Self::FormulaError { .. })
    }
}

/// Outcome of a single score for a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Computed(f64),
    Missed(MissReason),
}

/// Computed and missed scores for one record.
///
/// Every score lands in exactly one of the two maps; [`RecordScores::record`]
/// moves a name out of the other map when it is recorded again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordScores {
    computed: OrderedMap<f64>,
    missed: OrderedMap<MissReason>,
}

impl RecordScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, score: impl Into<String>, outcome: ScoreOutcome) {
        let score = score.into();
        match outcome {
            ScoreOutcome::Computed(value) => {
                self.missed.remove(&score);
                self.computed.insert(score, value);
            }
            ScoreOutcome::Missed(reason) => {
                self.computed.remove(&score);
                self.missed.insert(score, reason);
            }
        }
    }

    pub fn computed(&self) -> &OrderedMap<f64> {
        &self.computed
    }

    pub fn missed(&self) -> &OrderedMap<MissReason> {
        &self.missed
    }

    pub fn value(&self, score: &str) -> Option<f64> {
        self.computed.get(score).copied()
    }

    pub fn miss_reason(&self, score: &str) -> Option<&MissReason> {
        self.missed.get(score)
    }

    pub fn computed_names(&self) -> impl Iterator<Item = &str> {
        self.computed.keys()
    }

    pub fn missed_names(&self) -> impl Iterator<Item = &str> {
        self.missed.keys()
    }

    pub fn len(&self) -> usize {
        self.computed.len() + self.missed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.computed.is_empty() && self.missed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_again_moves_between_maps() {
        let mut scores = RecordScores::new();
        scores.record("CHA2DS2-VASc", ScoreOutcome::Computed(3.0));
        scores.record(
            "CHA2DS2-VASc",
            ScoreOutcome::Missed(MissReason::FormulaError {
                message: "division by zero".to_string(),
            }),
        );
        assert!(scores.value("CHA2DS2-VASc").is_none());
        assert_eq!(
            scores.miss_reason("CHA2DS2-VASc").map(MissReason::reasons),
            Some(vec![FORMULA_ERROR.to_string()])
        );
        assert_eq!(scores.len(), 1);
    }

    #[test]
    fn missing_variables_flatten_to_names() {
        let reason = MissReason::MissingVariables {
            variables: vec!["age".to_string(), "creatinine".to_string()],
        };
        assert_eq!(reason.reasons(), vec!["age", "creatinine"]);
        assert!(!reason.is_formula_error());
    }
}
