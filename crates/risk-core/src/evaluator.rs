//! Formula evaluation for a single record.
//!
//! Each score is decided independently: a required variable that is unbound
//! in the alias map, or whose cell is empty, marks the score as missing its
//! variables and the formula is not run. Any compile or runtime failure of a
//! formula marks that score alone as a formula error.

use tracing::debug;

use risk_formula::{Bindings, EvalLimits, Formula, FormulaError, Value};
use risk_model::{
    AliasMap, CellValue, MissReason, RecordScores, RecordView, ScoreDefinitions, ScoreOutcome,
};

use crate::diagnostics::Diagnostics;

/// One score definition, compiled.
#[derive(Debug, Clone)]
struct CompiledScore {
    name: String,
    variables: Vec<String>,
    formula: Result<Formula, FormulaError>,
}

/// Score definitions compiled once for a run.
#[derive(Debug, Clone)]
pub struct ScoreEngine {
    scores: Vec<CompiledScore>,
    limits: EvalLimits,
}

impl ScoreEngine {
    /// Compiles every formula. Compile errors are kept and reported for each
    /// record whose variables are all present.
    pub fn new(definitions: &ScoreDefinitions, limits: EvalLimits) -> Self {
        let scores = definitions
            .iter()
            .map(|(name, definition)| CompiledScore {
                name: name.to_string(),
                variables: definition.variables().to_vec(),
                formula: Formula::compile(definition.formula(), &limits),
            })
            .collect();
        Self { scores, limits }
    }

    pub fn limits(&self) -> &EvalLimits {
        &self.limits
    }

    pub fn score_names(&self) -> impl Iterator<Item = &str> {
        self.scores.iter().map(|score| score.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores whose formula failed to compile.
    pub fn compile_errors(&self) -> impl Iterator<Item = (&str, &FormulaError)> {
        self.scores
            .iter()
            .filter_map(|score| score.formula.as_ref().err().map(|e| (score.name.as_str(), e)))
    }

    /// Computes every score for one record.
    pub fn evaluate(
        &self,
        record: &RecordView<'_>,
        aliases: &AliasMap,
        diagnostics: &mut Diagnostics,
    ) -> RecordScores {
        let mut scores = RecordScores::new();
        for score in &self.scores {
            let outcome = self.evaluate_score(score, record, aliases, diagnostics);
            scores.record(score.name.clone(), outcome);
        }
        scores
    }

    fn evaluate_score(
        &self,
        score: &CompiledScore,
        record: &RecordView<'_>,
        aliases: &AliasMap,
        diagnostics: &mut Diagnostics,
    ) -> ScoreOutcome {
        let mut bindings = Bindings::new();
        let mut missing = Vec::new();
        for variable in &score.variables {
            let cell = aliases
                .column(variable)
                .and_then(|column| record.present(column));
            match cell.and_then(cell_value) {
                Some(value) => {
                    bindings.insert(variable.as_str(), value);
                }
                None => missing.push(variable.clone()),
            }
        }
        if !missing.is_empty() {
            debug!(
                record = record.id(),
                score = %score.name,
                missing = ?missing,
                "score skipped"
            );
            diagnostics.note_score(
                record.id(),
                &score.name,
                format!("missing {}", missing.join(", ")),
            );
            return ScoreOutcome::Missed(MissReason::MissingVariables { variables: missing });
        }

        let result = match &score.formula {
            Ok(formula) => formula.evaluate(&bindings, &self.limits),
            Err(error) => Err(error.clone()),
        };
        match result {
            Ok(value) => ScoreOutcome::Computed(value),
            Err(error) => {
                let message = error.to_string();
                diagnostics.warn_score(
                    record.id(),
                    &score.name,
                    format!("formula failed: {message}"),
                );
                ScoreOutcome::Missed(MissReason::FormulaError { message })
            }
        }
    }
}

/// Formula value for a present cell. Numeric text is read as a number.
pub fn cell_value(cell: &CellValue) -> Option<Value> {
    match cell {
        CellValue::Missing => None,
        CellValue::Number(value) if value.is_nan() => None,
        CellValue::Number(value) => Some(Value::Number(*value)),
        CellValue::Text(text) => match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(Value::Number(value)),
            _ => Some(Value::Text(text.clone())),
        },
    }
}

/// Evaluates one record with default limits, compiling the definitions on
/// the spot.
pub fn evaluate(
    record: &RecordView<'_>,
    aliases: &AliasMap,
    definitions: &ScoreDefinitions,
) -> (RecordScores, Diagnostics) {
    let engine = ScoreEngine::new(definitions, EvalLimits::default());
    let mut diagnostics = Diagnostics::new();
    let scores = engine.evaluate(record, aliases, &mut diagnostics);
    (scores, diagnostics)
}
