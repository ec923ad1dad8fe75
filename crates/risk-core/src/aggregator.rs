//! Per-record driver and run summary.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use risk_model::{AliasMap, RecordScores, RecordView, Table};

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::evaluator::ScoreEngine;

/// How records are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    /// Records are scored on a rayon pool; `threads: None` uses the global
    /// pool. Output order matches the input order.
    Parallel { threads: Option<usize> },
}

/// Scores for one input record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutcome {
    /// Zero-based position in the input table.
    pub index: usize,
    pub record_id: String,
    pub scores: RecordScores,
}

/// Every record outcome, in input order, plus merged diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunOutput {
    pub outcomes: Vec<RecordOutcome>,
    pub diagnostics: Diagnostics,
}

impl RunOutput {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes)
    }
}

fn score_record(
    index: usize,
    record: &RecordView<'_>,
    aliases: &AliasMap,
    engine: &ScoreEngine,
) -> (RecordOutcome, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let scores = engine.evaluate(record, aliases, &mut diagnostics);
    let outcome = RecordOutcome {
        index,
        record_id: record.id().to_string(),
        scores,
    };
    (outcome, diagnostics)
}

/// Lazily scores each record in table order.
pub fn records<'a>(
    table: &'a Table,
    aliases: &'a AliasMap,
    engine: &'a ScoreEngine,
) -> impl ExactSizeIterator<Item = (RecordOutcome, Diagnostics)> + 'a {
    table
        .records()
        .enumerate()
        .map(move |(index, record)| score_record(index, &record, aliases, engine))
}

/// Scores every record of `table`.
pub fn process(
    table: &Table,
    aliases: &AliasMap,
    engine: &ScoreEngine,
    mode: ExecutionMode,
) -> Result<RunOutput> {
    debug!(records = table.row_count(), ?mode, "processing records");
    let scored: Vec<(RecordOutcome, Diagnostics)> = match mode {
        ExecutionMode::Sequential => records(table, aliases, engine).collect(),
        ExecutionMode::Parallel { threads } => {
            let run = || {
                (0..table.row_count())
                    .into_par_iter()
                    .filter_map(|index| table.record(index).map(|record| (index, record)))
                    .map(|(index, record)| score_record(index, &record, aliases, engine))
                    .collect()
            };
            match threads {
                Some(threads) => ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?
                    .install(run),
                None => run(),
            }
        }
    };

    let mut output = RunOutput {
        outcomes: Vec::with_capacity(scored.len()),
        diagnostics: Diagnostics::new(),
    };
    for (outcome, diagnostics) in scored {
        output.outcomes.push(outcome);
        output.diagnostics.merge(diagnostics);
    }
    Ok(output)
}

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub record_id: String,
    pub computed: Vec<String>,
    pub missed: Vec<String>,
}

/// Per-score counts across all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreTally {
    pub score: String,
    pub computed: usize,
    pub missing_variables: usize,
    pub formula_errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: Vec<SummaryRow>,
    pub scores: Vec<ScoreTally>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[RecordOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            let scores = &outcome.scores;
            summary.rows.push(SummaryRow {
                record_id: outcome.record_id.clone(),
                computed: scores.computed_names().map(str::to_string).collect(),
                missed: scores.missed_names().map(str::to_string).collect(),
            });
            for name in scores.computed_names() {
                summary.tally(name).computed += 1;
            }
            for (name, reason) in scores.missed().iter() {
                let tally = summary.tally(name);
                if reason.is_formula_error() {
                    tally.formula_errors += 1;
                } else {
                    tally.missing_variables += 1;
                }
            }
        }
        summary
    }

    fn tally(&mut self, score: &str) -> &mut ScoreTally {
        let position = match self.scores.iter().position(|tally| tally.score == score) {
            Some(position) => position,
            None => {
                self.scores.push(ScoreTally {
                    score: score.to_string(),
                    computed: 0,
                    missing_variables: 0,
                    formula_errors: 0,
                });
                self.scores.len() - 1
            }
        };
        &mut self.scores[position]
    }

    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_computed(&self) -> usize {
        self.scores.iter().map(|tally| tally.computed).sum()
    }

    pub fn total_missed(&self) -> usize {
        self.scores
            .iter()
            .map(|tally| tally.missing_variables + tally.formula_errors)
            .sum()
    }
}
