use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {path}: {source}")]
    Excel {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {path} contains no sheets")]
    EmptyWorkbook { path: PathBuf },

    #[error("failed to parse YAML {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported file type for {path} (expected {expected})")]
    UnsupportedFormat {
        path: PathBuf,
        expected: &'static str,
    },

    #[error("index column '{column}' not found in {path}")]
    IndexColumn { path: PathBuf, column: String },

    #[error("invalid table in {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: risk_model::ModelError,
    },

    #[error("invalid definition in {path}: {message}")]
    Schema { path: PathBuf, message: String },
}

impl IngestError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn schema(path: &Path, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// The file the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Csv { path, .. }
            | Self::Excel { path, .. }
            | Self::EmptyWorkbook { path }
            | Self::Yaml { path, .. }
            | Self::Json { path, .. }
            | Self::Toml { path, .. }
            | Self::UnsupportedFormat { path, .. }
            | Self::IndexColumn { path, .. }
            | Self::Table { path, .. }
            | Self::Schema { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
