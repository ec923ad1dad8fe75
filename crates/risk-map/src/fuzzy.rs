//! Fuzzy string matching for column labels.
//!
//! Uses a token-sort ratio: both strings are normalized, split into tokens,
//! the tokens sorted and re-joined, and the results compared with the Indel
//! similarity from `rapidfuzz`. Token order therefore does not matter
//! ("Creatinine Serum" and "serum_creatinine" score 100).

use rapidfuzz::fuzz;
use serde::{Deserialize, Serialize};

/// Minimum similarity (0-100) for a match to be accepted.
pub const DEFAULT_CUTOFF: u8 = 80;

/// Options shared by orientation detection and alias resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Minimum similarity (0-100) for a match to count.
    pub cutoff: u8,
    /// Columns that must match a canonical variable for the table to keep
    /// its orientation.
    pub min_matching_columns: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            min_matching_columns: crate::orientation::MIN_MATCHING_COLUMNS,
        }
    }
}

impl MatchOptions {
    #[must_use]
    pub fn with_cutoff(mut self, cutoff: u8) -> Self {
        self.cutoff = cutoff.min(100);
        self
    }
}

/// The best candidate for a target string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch<'a> {
    /// The candidate as given (not normalized).
    pub candidate: &'a str,
    /// Position of the candidate in the input sequence.
    pub index: usize,
    /// Similarity in 0..=100.
    pub score: u8,
}

/// Normalizes text for comparison by trimming, lowercasing and replacing
/// separators with spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn sorted_tokens(raw: &str) -> String {
    let normalized = normalize_text(raw);
    let mut tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-order-insensitive similarity in 0..=100.
pub fn similarity(left: &str, right: &str) -> u8 {
    let left = sorted_tokens(left);
    let right = sorted_tokens(right);
    score_prepared(&left, &right)
}

fn score_prepared(left: &str, right: &str) -> u8 {
    if left.is_empty() || right.is_empty() {
        return 0;
    }
    let ratio = fuzz::ratio(left.chars(), right.chars());
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Returns the highest-scoring candidate regardless of score.
///
/// Ties keep the earliest candidate. `None` only for an empty candidate set.
pub fn extract_one<'a, I, S>(target: &str, candidates: I) -> Option<FuzzyMatch<'a>>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    let target = sorted_tokens(target);
    let mut best: Option<FuzzyMatch<'a>> = None;
    for (index, candidate) in candidates.into_iter().enumerate() {
        let candidate = candidate.as_ref();
        let score = score_prepared(&target, &sorted_tokens(candidate));
        if best.is_none_or(|current| score > current.score) {
            best = Some(FuzzyMatch {
                candidate,
                index,
                score,
            });
        }
    }
    best
}

/// Returns the best candidate when its score reaches `cutoff`.
pub fn best_match<'a, I, S>(target: &str, candidates: I, cutoff: u8) -> Option<FuzzyMatch<'a>>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    extract_one(target, candidates).filter(|found| found.score >= cutoff)
}
