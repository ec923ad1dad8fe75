//! CLI argument definitions for the risk-score engine.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use risk_report::ReportFormats;

#[derive(Parser)]
#[command(
    name = "risk-engine",
    version,
    about = "Compute clinical risk scores for every patient in a table",
    long_about = "Compute clinical risk scores for every patient in a table.\n\n\
                  Column labels are matched to canonical variables through a synonym\n\
                  dictionary, each score formula is evaluated per patient, and a report\n\
                  is written for every patient plus a summary.csv for the run."
)]
pub struct Cli {
    /// Patient table (csv, tsv, xlsx, xls, xlsb, ods).
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: PathBuf,

    /// Score definitions (yaml, json or toml).
    #[arg(short = 's', long = "scores", value_name = "PATH")]
    pub scores: PathBuf,

    /// Synonym dictionary (yaml, json or toml).
    #[arg(short = 'y', long = "synonyms", value_name = "PATH")]
    pub synonyms: PathBuf,

    /// Output directory, created if absent.
    #[arg(short = 'o', long = "out", value_name = "DIR")]
    pub out: PathBuf,

    /// Engine configuration file (TOML). Flags below override it.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report files written per patient (default: xlsx and html).
    #[arg(long = "format", value_enum)]
    pub format: Option<ReportFormatArg>,

    /// Minimum similarity (0-100) for a column to match a synonym.
    #[arg(long = "cutoff", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub cutoff: Option<u8>,

    /// Record id source: `auto`, `none`, or a column header.
    #[arg(long = "index-column", value_name = "COLUMN", default_value = "auto")]
    pub index_column: String,

    /// Score records on a thread pool.
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Worker threads for --parallel (default: one per core).
    #[arg(long = "threads", value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: Option<u16>,

    /// Wall-clock budget per formula evaluation, in milliseconds.
    #[arg(long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Never transpose the input table.
    #[arg(long = "no-orientation")]
    pub no_orientation: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Allow patient values in trace logs.
    #[arg(long = "log-data")]
    pub log_data: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormatArg {
    All,
    Xlsx,
    Html,
    Json,
    None,
}

impl ReportFormatArg {
    pub fn formats(self) -> ReportFormats {
        let only = |xlsx, html, json| ReportFormats { xlsx, html, json };
        match self {
            Self::All => ReportFormats::all(),
            Self::Xlsx => only(true, false, false),
            Self::Html => only(false, true, false),
            Self::Json => only(false, false, true),
            Self::None => ReportFormats::none(),
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
