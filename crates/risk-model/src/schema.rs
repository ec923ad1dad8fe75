//! Schema dictionaries and the resolved alias map.

use serde::{Deserialize, Serialize};

use crate::ordered::OrderedMap;

/// Canonical variable name to candidate column labels, most preferred first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymDictionary {
    entries: OrderedMap<Vec<String>>,
}

impl SynonymDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, variable: impl Into<String>, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            variable,
            candidates.into_iter().map(Into::into).collect(),
        );
    }

    pub fn candidates(&self, variable: &str) -> Option<&[String]> {
        self.entries.get(variable).map(Vec::as_slice)
    }

    /// Canonical variable names in definition order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(variable, candidates)| (variable, candidates.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for SynonymDictionary {
    fn from_iter<I: IntoIterator<Item = (S, Vec<String>)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(variable, candidates)| (variable.into(), candidates))
                .collect(),
        }
    }
}

/// A named formula and the canonical variables it requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDefinition {
    variables: Vec<String>,
    formula: String,
}

impl ScoreDefinition {
    /// Creates a definition; repeated variable names are kept once, in order
    /// of first appearance.
    pub fn new<I, S>(variables: I, formula: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for variable in variables {
            let variable = variable.into();
            if !unique.contains(&variable) {
                unique.push(variable);
            }
        }
        Self {
            variables: unique,
            formula: formula.into(),
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }
}

/// Score name to definition, in definition order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreDefinitions {
    entries: OrderedMap<ScoreDefinition>,
}

impl ScoreDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: ScoreDefinition) {
        self.entries.insert(name, definition);
    }

    pub fn get(&self, name: &str) -> Option<&ScoreDefinition> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScoreDefinition)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ScoreDefinition)> for ScoreDefinitions {
    fn from_iter<I: IntoIterator<Item = (S, ScoreDefinition)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, definition)| (name.into(), definition))
                .collect(),
        }
    }
}

/// Canonical variable to resolved column label.
///
/// Built once per run and read-only afterwards. Two variables may share a
/// column when their candidate lists overlap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap {
    bindings: OrderedMap<String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, variable: impl Into<String>, column: impl Into<String>) {
        self.bindings.insert(variable, column.into());
    }

    pub fn column(&self, variable: &str) -> Option<&str> {
        self.bindings.get(variable).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(variable, column)| (variable, column.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<V: Into<String>, C: Into<String>> FromIterator<(V, C)> for AliasMap {
    fn from_iter<I: IntoIterator<Item = (V, C)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (variable, column) in iter {
            map.bind(variable, column);
        }
        map
    }
}
