//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! detect_orientation = true
//!
//! [matching]
//! cutoff = 85
//!
//! [evaluation]
//! timeout_ms = 500
//!
//! [execution]
//! parallel = true
//! threads = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use risk_formula::{EvalLimits, MAX_NESTING_DEPTH};
use risk_map::MatchOptions;

use crate::aggregator::ExecutionMode;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    pub parallel: bool,
    /// Worker threads; `None` uses one per core.
    pub threads: Option<usize>,
}

impl ExecutionConfig {
    pub fn mode(&self) -> ExecutionMode {
        if self.parallel {
            ExecutionMode::Parallel {
                threads: self.threads,
            }
        } else {
            ExecutionMode::Sequential
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Transpose tables whose columns do not look like variables.
    pub detect_orientation: bool,
    pub matching: MatchOptions,
    pub evaluation: EvalLimits,
    pub execution: ExecutionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detect_orientation: true,
            matching: MatchOptions::default(),
            evaluation: EvalLimits::default(),
            execution: ExecutionConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.matching.cutoff > 100 {
            return Err(CoreError::Config(format!(
                "matching.cutoff must be within 0..=100, got {}",
                self.matching.cutoff
            )));
        }
        if self.execution.threads == Some(0) {
            return Err(CoreError::Config(
                "execution.threads must be at least 1".to_string(),
            ));
        }
        if self.evaluation.max_steps == 0 || self.evaluation.max_depth == 0 {
            return Err(CoreError::Config(
                "evaluation limits must be positive".to_string(),
            ));
        }
        if self.evaluation.max_depth > MAX_NESTING_DEPTH {
            return Err(CoreError::Config(format!(
                "evaluation.max_depth must be at most {MAX_NESTING_DEPTH}, got {}",
                self.evaluation.max_depth
            )));
        }
        Ok(())
    }
}
