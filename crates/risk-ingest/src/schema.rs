//! Score definition and synonym dictionary files.
//!
//! Both files are mappings whose key order is preserved. Score definitions:
//!
//! ```yaml
//! CKD-EPI:
//!   variables: [age, creatinine]      # or a mapping name -> description
//!   formula: |
//!     score = 141 * creatinine
//! ```
//!
//! Synonyms map each canonical variable to one candidate label or a list of
//! them, most preferred first:
//!
//! ```yaml
//! age: [Age, AGE_YEARS]
//! creatinine: Creat
//! ```

use std::path::Path;

use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;

use risk_model::{OrderedMap, ScoreDefinition, ScoreDefinitions, SynonymDictionary};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    Json,
    Toml,
}

impl SchemaFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                expected: "yaml, yml, json or toml",
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawVariables {
    List(Vec<String>),
    Described(OrderedMap<IgnoredAny>),
}

#[derive(Debug, Deserialize)]
struct RawScore {
    #[serde(default)]
    variables: Option<RawVariables>,
    #[serde(alias = "expression")]
    formula: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCandidates {
    Many(Vec<String>),
    One(String),
}

fn parse_text<T: DeserializeOwned>(
    text: &str,
    format: SchemaFormat,
    path: &Path,
) -> Result<Option<T>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value = match format {
        SchemaFormat::Yaml => serde_yaml::from_str(text).map_err(|source| IngestError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
        SchemaFormat::Json => serde_json::from_str(text).map_err(|source| IngestError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        SchemaFormat::Toml => toml::from_str(text).map_err(|source| IngestError::Toml {
            path: path.to_path_buf(),
            source,
        })?,
    };
    Ok(Some(value))
}

fn read_file(path: &Path) -> Result<(String, SchemaFormat)> {
    let format = SchemaFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::io(path, source))?;
    Ok((text, format))
}

/// Parses score definitions from text. `path` is only used in errors.
pub fn parse_score_definitions(
    text: &str,
    format: SchemaFormat,
    path: &Path,
) -> Result<ScoreDefinitions> {
    let raw: Option<OrderedMap<RawScore>> = parse_text(text, format, path)?;
    let mut definitions = ScoreDefinitions::new();
    for (name, score) in raw.unwrap_or_default() {
        if name.trim().is_empty() {
            return Err(IngestError::schema(path, "score with an empty name"));
        }
        let variables: Vec<String> = match score.variables {
            Some(RawVariables::List(names)) => names,
            Some(RawVariables::Described(names)) => names.keys().map(str::to_string).collect(),
            None => Vec::new(),
        };
        if score.formula.trim().is_empty() {
            return Err(IngestError::schema(
                path,
                format!("score '{name}' has an empty formula"),
            ));
        }
        definitions.insert(name, ScoreDefinition::new(variables, score.formula));
    }
    Ok(definitions)
}

/// Parses a synonym dictionary from text. `path` is only used in errors.
pub fn parse_synonyms(text: &str, format: SchemaFormat, path: &Path) -> Result<SynonymDictionary> {
    let raw: Option<OrderedMap<RawCandidates>> = parse_text(text, format, path)?;
    let mut dictionary = SynonymDictionary::new();
    for (variable, candidates) in raw.unwrap_or_default() {
        let candidates = match candidates {
            RawCandidates::Many(list) => list,
            RawCandidates::One(single) => vec![single],
        };
        dictionary.insert(variable, candidates);
    }
    Ok(dictionary)
}

/// Loads score definitions, choosing the parser by file extension.
pub fn load_score_definitions(path: &Path) -> Result<ScoreDefinitions> {
    let (text, format) = read_file(path)?;
    let definitions = parse_score_definitions(&text, format, path)?;
    debug!(path = %path.display(), scores = definitions.len(), "score definitions loaded");
    Ok(definitions)
}

/// Loads a synonym dictionary, choosing the parser by file extension.
pub fn load_synonyms(path: &Path) -> Result<SynonymDictionary> {
    let (text, format) = read_file(path)?;
    let dictionary = parse_synonyms(&text, format, path)?;
    debug!(path = %path.display(), variables = dictionary.len(), "synonyms loaded");
    Ok(dictionary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "defs.yaml";

    #[test]
    fn yaml_definitions_keep_file_order() {
        let text = "\
zeta:
  variables: [b, a, b]
  formula: score = a + b
alpha:
  variables:
    age: patient age in years
  expression: score = age
";
        let definitions =
            parse_score_definitions(text, SchemaFormat::Yaml, Path::new(PATH)).expect("parse");
        assert_eq!(definitions.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        let zeta = definitions.get("zeta").expect("zeta");
        assert_eq!(zeta.variables(), ["b".to_string(), "a".to_string()]);
        let alpha = definitions.get("alpha").expect("alpha");
        assert_eq!(alpha.variables(), ["age".to_string()]);
        assert_eq!(alpha.formula(), "score = age");
    }

    #[test]
    fn synonyms_accept_single_strings() {
        let text = r#"{"age": ["Age", "AGE_YRS"], "creatinine": "Creat"}"#;
        let dictionary =
            parse_synonyms(text, SchemaFormat::Json, Path::new("syn.json")).expect("parse");
        assert_eq!(
            dictionary.candidates("creatinine"),
            Some(["Creat".to_string()].as_slice())
        );
        assert_eq!(dictionary.variables().collect::<Vec<_>>(), vec!["age", "creatinine"]);
    }

    #[test]
    fn toml_definitions_parse() {
        let text = "[bmi]\nvariables = [\"weight\", \"height\"]\nformula = \"score = weight / (height / 100) ** 2\"\n";
        let definitions =
            parse_score_definitions(text, SchemaFormat::Toml, Path::new("defs.toml")).expect("parse");
        assert_eq!(definitions.len(), 1);
        assert_eq!(
            definitions.get("bmi").map(ScoreDefinition::variables),
            Some(["weight".to_string(), "height".to_string()].as_slice())
        );
    }

    #[test]
    fn empty_formula_is_rejected() {
        let text = "broken:\n  variables: [a]\n  formula: '  '\n";
        let error = parse_score_definitions(text, SchemaFormat::Yaml, Path::new(PATH))
            .expect_err("empty formula");
        assert!(matches!(error, IngestError::Schema { .. }));
        assert_eq!(error.path(), Path::new(PATH));
    }

    #[test]
    fn empty_file_yields_empty_definitions() {
        let definitions =
            parse_score_definitions("", SchemaFormat::Yaml, Path::new(PATH)).expect("parse");
        assert!(definitions.is_empty());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            SchemaFormat::from_path(Path::new("defs.ini")),
            Err(IngestError::UnsupportedFormat { .. })
        ));
    }
}
