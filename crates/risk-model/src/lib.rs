//! Data model for the risk-score engine.
//!
//! Holds the in-memory [`Table`], the two schema dictionaries
//! ([`SynonymDictionary`], [`ScoreDefinitions`]), the resolved [`AliasMap`]
//! and the per-record result types ([`RecordScores`], [`MissReason`]).

#![deny(unsafe_code)]

pub mod error;
pub mod ordered;
pub mod schema;
pub mod scores;
pub mod table;

pub use error::{ModelError, Result};
pub use ordered::OrderedMap;
pub use schema::{AliasMap, ScoreDefinition, ScoreDefinitions, SynonymDictionary};
pub use scores::{FORMULA_ERROR, MissReason, RecordScores, ScoreOutcome};
pub use table::{CellValue, RecordView, Table, format_numeric};
