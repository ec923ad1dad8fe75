//! Alias resolution: canonical variable name to actual column label.
//!
//! For every canonical variable the candidate labels are tried in dictionary
//! order and the first candidate that fuzzy-matches a column binds the
//! variable. Later candidates are not consulted even if they would match a
//! different column more strongly. Bindings are not deduplicated: two
//! variables with overlapping candidates may end up on the same column.

use serde::Serialize;

use risk_model::{AliasMap, SynonymDictionary, Table};

use crate::fuzzy::{MatchOptions, best_match};

/// How a canonical variable was bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasBinding {
    pub variable: String,
    /// The candidate label that produced the match.
    pub candidate: String,
    /// Position of that candidate in the variable's candidate list.
    pub candidate_rank: usize,
    pub column: String,
    pub score: u8,
}

/// Alias map plus the details behind it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AliasResolution {
    pub aliases: AliasMap,
    pub bindings: Vec<AliasBinding>,
    /// Canonical variables with no candidate reaching the cutoff.
    pub unresolved: Vec<String>,
}

impl AliasResolution {
    /// Columns bound by more than one variable, with the variables sharing them.
    pub fn shared_columns(&self) -> Vec<(&str, Vec<&str>)> {
        let mut shared: Vec<(&str, Vec<&str>)> = Vec::new();
        for binding in &self.bindings {
            match shared
                .iter_mut()
                .find(|(column, _)| *column == binding.column)
            {
                Some((_, variables)) => variables.push(binding.variable.as_str()),
                None => shared.push((binding.column.as_str(), vec![binding.variable.as_str()])),
            }
        }
        shared.retain(|(_, variables)| variables.len() > 1);
        shared
    }
}

/// Builds the alias map for `table` using default matching options.
pub fn build_alias_map(table: &Table, synonyms: &SynonymDictionary) -> AliasMap {
    resolve_aliases(table.columns(), synonyms, &MatchOptions::default()).aliases
}

/// Resolves every canonical variable against `columns`.
pub fn resolve_aliases<S: AsRef<str>>(
    columns: &[S],
    synonyms: &SynonymDictionary,
    options: &MatchOptions,
) -> AliasResolution {
    let mut resolution = AliasResolution::default();
    for (variable, candidates) in synonyms.iter() {
        let binding = candidates
            .iter()
            .enumerate()
            .find_map(|(rank, candidate)| {
                best_match(candidate, columns.iter(), options.cutoff).map(|found| AliasBinding {
                    variable: variable.to_string(),
                    candidate: candidate.clone(),
                    candidate_rank: rank,
                    column: found.candidate.to_string(),
                    score: found.score,
                })
            });
        match binding {
            Some(binding) => {
                resolution
                    .aliases
                    .bind(binding.variable.clone(), binding.column.clone());
                resolution.bindings.push(binding);
            }
            None => resolution.unresolved.push(variable.to_string()),
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary(entries: &[(&str, &[&str])]) -> SynonymDictionary {
        let mut dictionary = SynonymDictionary::new();
        for (variable, candidates) in entries {
            dictionary.insert(*variable, candidates.iter().copied());
        }
        dictionary
    }

    #[test]
    fn first_acceptable_candidate_wins() {
        let columns = ["Serum Creatinine", "Creatinine"];
        let synonyms = dictionary(&[("creatinine", &["creatinine_serum", "creatinine"])]);
        let resolution = resolve_aliases(&columns, &synonyms, &MatchOptions::default());
        assert_eq!(
            resolution.aliases.column("creatinine"),
            Some("Serum Creatinine")
        );
        assert_eq!(resolution.bindings[0].candidate_rank, 0);
    }

    #[test]
    fn unmatched_variables_stay_unbound() {
        let columns = ["Age"];
        let synonyms = dictionary(&[("age", &["age"]), ("bilirubin", &["Bili", "TBIL"])]);
        let resolution = resolve_aliases(&columns, &synonyms, &MatchOptions::default());
        assert_eq!(resolution.aliases.len(), 1);
        assert_eq!(resolution.unresolved, vec!["bilirubin".to_string()]);
    }

    #[test]
    fn overlapping_candidates_share_a_column() {
        let columns = ["Weight"];
        let synonyms = dictionary(&[("weight", &["weight"]), ("body_mass", &["weight"])]);
        let resolution = resolve_aliases(&columns, &synonyms, &MatchOptions::default());
        assert_eq!(resolution.aliases.column("weight"), Some("Weight"));
        assert_eq!(resolution.aliases.column("body_mass"), Some("Weight"));
        assert_eq!(
            resolution.shared_columns(),
            vec![("Weight", vec!["weight", "body_mass"])]
        );
    }
}
