//! Schema reconciliation: fuzzy matching of labels, table orientation
//! detection and alias resolution.

#![deny(unsafe_code)]

pub mod alias;
pub mod fuzzy;
pub mod orientation;

pub use alias::{AliasBinding, AliasResolution, build_alias_map, resolve_aliases};
pub use fuzzy::{
    DEFAULT_CUTOFF, FuzzyMatch, MatchOptions, best_match, extract_one, normalize_text,
    similarity,
};
pub use orientation::{
    ColumnMatch, MIN_MATCHING_COLUMNS, OrientationReport, assess_orientation, detect_orientation,
    detect_orientation_with,
};
