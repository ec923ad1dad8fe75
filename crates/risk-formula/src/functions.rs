// Built-in function allow-list. Every name may also be called with a `math.`
// prefix.

use crate::error::{FormulaError, Result};
use crate::value::Value;

/// Callable function names (without the optional `math.` prefix).
pub const FUNCTIONS: &[&str] = &[
    "abs", "min", "max", "round", "pow", "sqrt", "exp", "log", "log10", "floor", "ceil", "int",
    "float",
];

/// Named constants available when not shadowed by a binding.
pub(crate) fn constant(name: &str) -> Option<f64> {
    match name.strip_prefix("math.").unwrap_or(name) {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

pub(crate) fn is_known(name: &str) -> bool {
    FUNCTIONS.contains(&name.strip_prefix("math.").unwrap_or(name))
}

pub(crate) fn call(name: &str, args: &[Value]) -> Result<Value> {
    let function = name.strip_prefix("math.").unwrap_or(name);
    let value = match function {
        "abs" => unary(function, args)?.abs(),
        "sqrt" => {
            let x = unary(function, args)?;
            if x < 0.0 {
                return Err(FormulaError::Domain(function.to_string()));
            }
            x.sqrt()
        }
        "exp" => unary(function, args)?.exp(),
        "log10" => positive(function, unary(function, args)?)?.log10(),
        "log" => match args {
            [x] => positive(function, x.number(function)?)?.ln(),
            [x, base] => {
                let x = positive(function, x.number(function)?)?;
                let base = positive(function, base.number(function)?)?;
                if base == 1.0 {
                    return Err(FormulaError::DivisionByZero);
                }
                x.ln() / base.ln()
            }
            _ => return Err(arity(function, "1 or 2", args)),
        },
        "floor" => unary(function, args)?.floor(),
        "ceil" => unary(function, args)?.ceil(),
        "int" => match args {
            [Value::Text(text)] => parse_text(function, text)?.trunc(),
            _ => unary(function, args)?.trunc(),
        },
        "float" => match args {
            [Value::Text(text)] => parse_text(function, text)?,
            _ => unary(function, args)?,
        },
        "pow" => match args {
            [base, exponent] => power(base.number(function)?, exponent.number(function)?)?,
            _ => return Err(arity(function, "2", args)),
        },
        "round" => match args {
            [x] => x.number(function)?.round_ties_even(),
            [x, digits] => {
                let x = x.number(function)?;
                let digits = digits.number(function)?;
                if digits.fract() != 0.0 {
                    return Err(FormulaError::Type(
                        "round() digits must be an integer".to_string(),
                    ));
                }
                round_to(x, digits)
            }
            _ => return Err(arity(function, "1 or 2", args)),
        },
        "min" | "max" => {
            if args.is_empty() {
                return Err(arity(function, "at least 1", args));
            }
            let mut best = args[0].number(function)?;
            for arg in &args[1..] {
                let x = arg.number(function)?;
                let better = if function == "min" { x < best } else { x > best };
                if better {
                    best = x;
                }
            }
            best
        }
        _ => return Err(FormulaError::UnknownFunction(name.to_string())),
    };
    if value.is_finite() {
        Ok(Value::Number(value))
    } else {
        Err(FormulaError::NonFinite)
    }
}

/// `base ** exponent` with the failure modes of real-valued exponentiation.
pub(crate) fn power(base: f64, exponent: f64) -> Result<f64> {
    if base == 0.0 && exponent < 0.0 {
        return Err(FormulaError::DivisionByZero);
    }
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(FormulaError::Domain("**".to_string()));
    }
    Ok(base.powf(exponent))
}

fn unary(function: &str, args: &[Value]) -> Result<f64> {
    match args {
        [x] => x.number(function),
        _ => Err(arity(function, "1", args)),
    }
}

fn positive(function: &str, x: f64) -> Result<f64> {
    if x > 0.0 {
        Ok(x)
    } else {
        Err(FormulaError::Domain(function.to_string()))
    }
}

fn parse_text(function: &str, text: &str) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|_| {
        FormulaError::Type(format!("{function}() cannot convert '{text}' to a number"))
    })
}

fn arity(function: &str, expected: &'static str, args: &[Value]) -> FormulaError {
    FormulaError::Arity {
        function: function.to_string(),
        expected,
        actual: args.len(),
    }
}

// Past +/-308 digits the scale itself is not representable.
fn round_to(x: f64, digits: f64) -> f64 {
    if digits > 308.0 {
        return x;
    }
    if digits < -308.0 {
        return 0.0f64.copysign(x);
    }
    let scale = 10f64.powi(digits as i32);
    let scaled = x * scale;
    if !scaled.is_finite() {
        return x;
    }
    scaled.round_ties_even() / scale
}
