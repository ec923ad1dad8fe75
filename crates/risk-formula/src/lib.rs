//! Sandboxed expression language for score formulas.
//!
//! A formula is a short program of assignments and expressions. It can read
//! the names it is given and call an allow-listed set of math functions;
//! nothing else is reachable. The result is the value bound to
//! [`RESULT_NAME`] when the program finishes.
//!
//! ```
//! use risk_formula::{Bindings, EvalLimits, Formula};
//!
//! let limits = EvalLimits::default();
//! let formula = Formula::compile("score = 141 * creatinine", &limits).unwrap();
//! let bindings: Bindings = [("creatinine", 1.2)].into_iter().collect();
//! let value = formula.evaluate(&bindings, &limits).unwrap();
//! assert!((value - 169.2).abs() < 1e-9);
//! ```

pub mod ast;
mod error;
mod eval;
mod functions;
mod lexer;
mod parser;
mod value;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::{FormulaError, Result};
pub use functions::FUNCTIONS;
pub use value::{Bindings, Value};

use crate::ast::Program;
use crate::eval::Interpreter;

/// Name whose final binding is the formula's result.
pub const RESULT_NAME: &str = "score";

/// Highest accepted `max_depth`. Parsing and evaluation recurse once per
/// nesting level, and this bound keeps both within a 2 MiB thread stack.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Resource bounds for compiling and running one formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalLimits {
    /// Maximum number of evaluated expression nodes.
    pub max_steps: u64,
    /// Maximum syntactic nesting (parentheses, unary operators, `**`).
    /// Values above [`MAX_NESTING_DEPTH`] are clamped to it.
    pub max_depth: usize,
    /// Maximum formula length in bytes.
    pub max_source_len: usize,
    /// Wall-clock budget per evaluation, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_depth: MAX_NESTING_DEPTH,
            max_source_len: 16_384,
            timeout_ms: 250,
        }
    }
}

impl EvalLimits {
    /// `max_depth` as enforced when compiling.
    pub fn nesting_depth(&self) -> usize {
        self.max_depth.min(MAX_NESTING_DEPTH)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

/// A parsed formula, ready to be evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    program: Program,
}

impl Formula {
    /// Parses `source`, enforcing the length and nesting limits.
    pub fn compile(source: &str, limits: &EvalLimits) -> Result<Self> {
        if source.len() > limits.max_source_len {
            return Err(FormulaError::TooLong {
                limit: limits.max_source_len,
            });
        }
        let program = parser::parse(source, limits.nesting_depth())?;
        Ok(Self {
            source: source.to_string(),
            program,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Runs the program and returns the number bound to [`RESULT_NAME`].
    pub fn evaluate(&self, bindings: &Bindings, limits: &EvalLimits) -> Result<f64> {
        let scope = Interpreter::new(bindings.clone().into_scope(), limits).run(&self.program)?;
        let result = scope
            .get(RESULT_NAME)
            .ok_or_else(|| FormulaError::NoResult(RESULT_NAME.to_string()))?;
        let value = result
            .as_number()
            .ok_or_else(|| FormulaError::NonNumericResult(RESULT_NAME.to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFinite)
        }
    }
}

/// Compiles and evaluates `source` in one call.
pub fn evaluate(source: &str, bindings: &Bindings, limits: &EvalLimits) -> Result<f64> {
    Formula::compile(source, limits)?.evaluate(bindings, limits)
}
