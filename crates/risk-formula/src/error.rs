use thiserror::Error;

/// Errors raised while compiling or evaluating a formula.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("parse error at offset {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("formula is longer than {limit} characters")]
    TooLong { limit: usize },
    #[error("formula nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
    #[error("name '{0}' is not defined")]
    UnknownName(String),
    #[error("function '{0}' is not available")]
    UnknownFunction(String),
    #[error("{function}() takes {expected} argument(s), got {actual}")]
    Arity {
        function: String,
        expected: &'static str,
        actual: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("math domain error in {0}")]
    Domain(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("result is not a finite number")]
    NonFinite,
    #[error("formula never assigns '{0}'")]
    NoResult(String),
    #[error("'{0}' is not numeric")]
    NonNumericResult(String),
    #[error("evaluation exceeded {limit} steps")]
    StepLimit { limit: u64 },
    #[error("evaluation exceeded {limit_ms} ms")]
    Timeout { limit_ms: u128 },
}

impl FormulaError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// True for failures caused by the evaluation budget rather than the formula.
    pub fn is_limit(&self) -> bool {
        matches!(self, Self::StepLimit { .. } | Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, FormulaError>;
