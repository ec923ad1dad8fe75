//! Per-record score evaluation.
//!
//! [`ScoreEngine`] compiles the score definitions once and decides each score
//! of a record independently; [`process`] drives it over a whole table,
//! sequentially or on a rayon pool, and [`run_pipeline`] adds orientation
//! detection and alias resolution in front.

#![deny(unsafe_code)]

pub mod aggregator;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod pipeline;

pub use aggregator::{
    ExecutionMode, RecordOutcome, RunOutput, RunSummary, ScoreTally, SummaryRow, process, records,
};
pub use config::{EngineConfig, ExecutionConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CoreError, Result};
pub use evaluator::{ScoreEngine, cell_value, evaluate};
pub use pipeline::{PipelineOutput, run_pipeline};
