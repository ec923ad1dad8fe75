// Tree-walking interpreter with a step budget and a wall-clock deadline.

use std::collections::HashMap;
use std::time::Instant;

use crate::EvalLimits;
use crate::ast::{BinaryOp, CompareOp, Expr, Program, Stmt, UnaryOp};
use crate::error::{FormulaError, Result};
use crate::functions;
use crate::value::Value;

/// Steps between two deadline checks.
const CLOCK_INTERVAL: u64 = 256;

pub(crate) struct Interpreter<'l> {
    scope: HashMap<String, Value>,
    limits: &'l EvalLimits,
    steps: u64,
    started: Instant,
}

impl<'l> Interpreter<'l> {
    pub(crate) fn new(scope: HashMap<String, Value>, limits: &'l EvalLimits) -> Self {
        Self {
            scope,
            limits,
            steps: 0,
            started: Instant::now(),
        }
    }

    pub(crate) fn run(mut self, program: &Program) -> Result<HashMap<String, Value>> {
        for statement in &program.statements {
            match statement {
                Stmt::Assign { name, value } => {
                    let value = self.eval(value)?;
                    self.scope.insert(name.clone(), value);
                }
                Stmt::Expr(expr) => {
                    self.eval(expr)?;
                }
            }
        }
        Ok(self.scope)
    }

    fn tick(&mut self) -> Result<()> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(FormulaError::StepLimit {
                limit: self.limits.max_steps,
            });
        }
        if self.steps % CLOCK_INTERVAL == 0 && self.started.elapsed() > self.limits.timeout() {
            return Err(FormulaError::Timeout {
                limit_ms: self.limits.timeout().as_millis(),
            });
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        self.tick()?;
        match expr {
            Expr::Number(value) => Ok(Value::Number(*value)),
            Expr::Text(text) => Ok(Value::Text(text.clone())),
            Expr::Bool(flag) => Ok(Value::Bool(*flag)),
            Expr::Name(name) => self.lookup(name),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
                    UnaryOp::Neg => Ok(Value::Number(-value.number("unary '-'")?)),
                    UnaryOp::Pos => Ok(Value::Number(value.number("unary '+'")?)),
                }
            }
            Expr::Chain { first, rest } => {
                let mut acc = self.eval(first)?;
                for (op, operand) in rest {
                    let right = self.eval(operand)?;
                    acc = arithmetic(*op, &acc, &right)?;
                }
                Ok(acc)
            }
            Expr::Power { base, exponent } => {
                let base = self.eval(base)?.number("'**'")?;
                let exponent = self.eval(exponent)?.number("'**'")?;
                finite(functions::power(base, exponent)?)
            }
            Expr::Compare { first, rest } => {
                let mut left = self.eval(first)?;
                for (op, operand) in rest {
                    let right = self.eval(operand)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::And(operands) => self.logical(operands, false),
            Expr::Or(operands) => self.logical(operands, true),
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(condition)?.truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Call { name, args } => {
                if !functions::is_known(name) {
                    return Err(FormulaError::UnknownFunction(name.clone()));
                }
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>>>()?;
                functions::call(name, &args)
            }
        }
    }

    /// `and`/`or` with short-circuit, returning the deciding operand.
    fn logical(&mut self, operands: &[Expr], stop_when: bool) -> Result<Value> {
        let mut last = Value::Bool(!stop_when);
        for operand in operands {
            last = self.eval(operand)?;
            if last.truthy() == stop_when {
                break;
            }
        }
        Ok(last)
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.scope.get(name) {
            return Ok(value.clone());
        }
        functions::constant(name)
            .map(Value::Number)
            .ok_or_else(|| FormulaError::UnknownName(name.to_string()))
    }
}

fn finite(value: f64) -> Result<Value> {
    if value.is_finite() {
        Ok(Value::Number(value))
    } else {
        Err(FormulaError::NonFinite)
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    if let (BinaryOp::Add, Value::Text(a), Value::Text(b)) = (op, left, right) {
        return Ok(Value::Text(format!("{a}{b}")));
    }
    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(FormulaError::Type(format!(
            "unsupported operand types for {}: {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        )));
    };
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => {
            return Err(FormulaError::DivisionByZero);
        }
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        // Result takes the sign of the divisor.
        BinaryOp::Mod => a - b * (a / b).floor(),
    };
    finite(value)
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool> {
    let ordering = match (left, right) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Text(_), _) | (_, Value::Text(_)) => {
            return match op {
                CompareOp::Eq => Ok(false),
                CompareOp::NotEq => Ok(true),
                _ => Err(FormulaError::Type(format!(
                    "cannot order {} and {}",
                    left.type_name(),
                    right.type_name()
                ))),
            };
        }
        _ => {
            let a = left.number("comparison")?;
            let b = right.number("comparison")?;
            a.partial_cmp(&b)
        }
    };
    let Some(ordering) = ordering else {
        // NaN compares unequal to everything.
        return Ok(op == CompareOp::NotEq);
    };
    Ok(match op {
        CompareOp::Eq => ordering.is_eq(),
        CompareOp::NotEq => ordering.is_ne(),
        CompareOp::Lt => ordering.is_lt(),
        CompareOp::LtEq => ordering.is_le(),
        CompareOp::Gt => ordering.is_gt(),
        CompareOp::GtEq => ordering.is_ge(),
    })
}
