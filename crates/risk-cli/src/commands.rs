use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span, trace, warn};

use risk_core::{Diagnostics, EngineConfig, PipelineOutput, RunSummary, Severity, run_pipeline};
use risk_ingest::{IndexColumn, TableOptions, load_score_definitions, load_synonyms, read_table};
use risk_report::{
    RecordReport, ReportFormats, ReportWriter, SUMMARY_FILE_NAME, write_summary_csv,
};

use crate::cli::{Cli, ReportFormatArg};
use crate::logging::redact_value;

/// What a run produced, for the console summary.
#[derive(Debug)]
pub struct RunResult {
    pub out_dir: PathBuf,
    pub summary_path: PathBuf,
    pub summary: RunSummary,
    pub transposed: bool,
    /// `(variable, column)` pairs in binding order.
    pub aliases: Vec<(String, String)>,
    pub unresolved: Vec<String>,
    pub reports_written: usize,
    pub report_failures: usize,
    pub warnings: usize,
}

/// Engine configuration from `--config` with command-line overrides applied.
pub fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(cutoff) = cli.cutoff {
        config.matching.cutoff = cutoff;
    }
    if cli.no_orientation {
        config.detect_orientation = false;
    }
    if cli.parallel {
        config.execution.parallel = true;
    }
    if let Some(threads) = cli.threads {
        config.execution.threads = Some(usize::from(threads));
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.evaluation.timeout_ms = timeout_ms;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

pub fn run(cli: &Cli) -> Result<RunResult> {
    let span = info_span!("run", input = %cli.input.display());
    let _guard = span.enter();
    let start = Instant::now();
    let config = engine_config(cli)?;

    let options = TableOptions {
        index: IndexColumn::from_arg(&cli.index_column),
    };
    let table = read_table(&cli.input, &options)
        .with_context(|| format!("load input {}", cli.input.display()))?;
    let definitions = load_score_definitions(&cli.scores)
        .with_context(|| format!("load score definitions {}", cli.scores.display()))?;
    let synonyms = load_synonyms(&cli.synonyms)
        .with_context(|| format!("load synonyms {}", cli.synonyms.display()))?;
    info!(
        records = table.row_count(),
        columns = table.column_count(),
        scores = definitions.len(),
        variables = synonyms.len(),
        "inputs loaded"
    );

    let output = run_pipeline(table, &synonyms, &definitions, &config).context("score records")?;
    forward_diagnostics(&output.run.diagnostics);

    let formats = cli
        .format
        .map_or_else(ReportFormats::default, ReportFormatArg::formats);
    let mut writer = ReportWriter::create(&cli.out, formats)
        .with_context(|| format!("create output directory {}", cli.out.display()))?;
    let (reports_written, report_failures) = write_reports(&output, &mut writer)?;

    let summary_path = cli.out.join(SUMMARY_FILE_NAME);
    let rows = output
        .run
        .outcomes
        .iter()
        .map(|outcome| (outcome.record_id.as_str(), &outcome.scores));
    write_summary_csv(&summary_path, rows)
        .with_context(|| format!("write {}", summary_path.display()))?;

    let summary = output.run.summary();
    info!(
        records = summary.record_count(),
        computed = summary.total_computed(),
        missed = summary.total_missed(),
        reports = reports_written,
        failed_reports = report_failures,
        elapsed_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(RunResult {
        out_dir: cli.out.clone(),
        summary_path,
        summary,
        transposed: output.orientation.as_ref().is_some_and(|report| report.transpose),
        aliases: output
            .resolution
            .aliases
            .iter()
            .map(|(variable, column)| (variable.to_string(), column.to_string()))
            .collect(),
        unresolved: output.resolution.unresolved.clone(),
        reports_written,
        report_failures,
        warnings: output.run.diagnostics.warning_count(),
    })
}

/// Writes the report files of every record. A failed record is logged and
/// counted; the remaining records are still written.
fn write_reports(output: &PipelineOutput, writer: &mut ReportWriter) -> Result<(usize, usize)> {
    if writer.is_empty() {
        return Ok((0, 0));
    }
    let progress = progress_bar(output.run.outcomes.len());
    let mut written = 0usize;
    let mut failures = 0usize;
    for outcome in &output.run.outcomes {
        let record = output
            .table
            .record(outcome.index)
            .ok_or_else(|| anyhow!("record {} is not in the scored table", outcome.record_id))?;
        for (column, value) in record.values() {
            let shown = value.display();
            trace!(record = record.id(), column, value = redact_value(&shown), "raw value");
        }
        match writer.write(&RecordReport::new(record, &outcome.scores)) {
            Ok(paths) => written += paths.len(),
            Err(error) => {
                failures += 1;
                warn!(record = %outcome.record_id, path = %error.path().display(), %error, "report not written");
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();
    debug!(written, failures, out_dir = %writer.out_dir().display(), "reports written");
    Ok((written, failures))
}

fn progress_bar(len: usize) -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {pos}/{len} patients {wide_bar}") {
        bar.set_style(style);
    }
    bar
}

/// Sends collected diagnostics to the log.
pub fn forward_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        let record = diagnostic.record_id.as_deref().unwrap_or("-");
        let score = diagnostic.score.as_deref().unwrap_or("-");
        match diagnostic.severity {
            Severity::Warning => warn!(record, score, "{}", diagnostic.message),
            Severity::Info => info!(record, score, "{}", diagnostic.message),
        }
    }
}

/// Output directory path shown to the user.
pub fn display_dir(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
