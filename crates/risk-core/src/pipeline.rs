//! End-to-end scoring: orientation, alias resolution, evaluation.

use tracing::{debug, info, info_span, warn};

use risk_map::{AliasResolution, OrientationReport, assess_orientation, resolve_aliases};
use risk_model::{ScoreDefinitions, SynonymDictionary, Table};

use crate::aggregator::{RunOutput, process};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::evaluator::ScoreEngine;

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The table as scored, after any transpose.
    pub table: Table,
    /// `None` when orientation detection was disabled.
    pub orientation: Option<OrientationReport>,
    pub resolution: AliasResolution,
    pub run: RunOutput,
}

/// Reorients `table` if needed, resolves aliases once and scores every record.
pub fn run_pipeline(
    table: Table,
    synonyms: &SynonymDictionary,
    definitions: &ScoreDefinitions,
    config: &EngineConfig,
) -> Result<PipelineOutput> {
    let span = info_span!(
        "score_run",
        records = table.row_count(),
        columns = table.column_count(),
        scores = definitions.len()
    );
    let _guard = span.enter();

    let (table, orientation) = if config.detect_orientation {
        let canonical: Vec<&str> = synonyms.variables().collect();
        let report = assess_orientation(&table, &canonical, &config.matching);
        info!(
            matched = report.matched_count(),
            checked = report.columns_checked,
            transpose = report.transpose,
            "orientation checked"
        );
        let table = if report.transpose {
            table.transpose()
        } else {
            table
        };
        (table, Some(report))
    } else {
        (table, None)
    };

    let resolution = resolve_aliases(table.columns(), synonyms, &config.matching);
    for binding in &resolution.bindings {
        debug!(
            variable = %binding.variable,
            column = %binding.column,
            candidate = %binding.candidate,
            score = binding.score,
            "alias bound"
        );
    }
    for (column, variables) in resolution.shared_columns() {
        warn!(column, variables = ?variables, "column bound to several variables");
    }
    info!(
        bound = resolution.aliases.len(),
        unresolved = resolution.unresolved.len(),
        "aliases resolved"
    );

    let engine = ScoreEngine::new(definitions, config.evaluation);
    for (score, error) in engine.compile_errors() {
        warn!(score, error = %error, "formula does not compile");
    }

    let run = process(
        &table,
        &resolution.aliases,
        &engine,
        config.execution.mode(),
    )?;
    Ok(PipelineOutput {
        table,
        orientation,
        resolution,
        run,
    })
}
