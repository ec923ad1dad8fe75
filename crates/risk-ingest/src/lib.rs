//! Input loading: observation tables (CSV, spreadsheets) and the two schema
//! files (score definitions, synonym dictionary).

#![deny(unsafe_code)]

pub mod error;
pub mod schema;
pub mod table;

pub use error::{IngestError, Result};
pub use schema::{
    SchemaFormat, load_score_definitions, load_synonyms, parse_score_definitions, parse_synonyms,
};
pub use table::{
    IndexColumn, MISSING_TOKENS, TableOptions, normalize_header, parse_cell, read_csv_table,
    read_excel_table, read_table,
};
