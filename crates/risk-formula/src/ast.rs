//! Formula syntax tree.
//!
//! Left-associative operator runs are stored flat (`first` plus a list of
//! `(op, operand)` pairs) so the tree height only grows with real nesting.

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Bool(bool),
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `a + b - c` or `a * b / c`, evaluated left to right.
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },
    /// `base ** exponent`, right-associative.
    Power {
        base: Box<Expr>,
        exponent: Box<Expr>,
    },
    /// Comparison chain: `a < b <= c` means `a < b and b <= c`.
    Compare {
        first: Box<Expr>,
        rest: Vec<(CompareOp, Expr)>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    /// `then if condition else otherwise`
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { name: String, value: Expr },
    Expr(Expr),
}

/// A parsed formula: statements run in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    /// Names read anywhere in the program, in first-use order.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for statement in &self.statements {
            match statement {
                Stmt::Assign { value, .. } | Stmt::Expr(value) => value.collect_names(&mut names),
            }
        }
        let mut seen = std::collections::HashSet::new();
        names.retain(|name| seen.insert(*name));
        names
    }
}

impl Expr {
    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Name(name) => names.push(name),
            Self::Number(_) | Self::Text(_) | Self::Bool(_) => {}
            Self::Unary { operand, .. } => operand.collect_names(names),
            Self::Chain { first, rest } => {
                first.collect_names(names);
                for (_, operand) in rest {
                    operand.collect_names(names);
                }
            }
            Self::Compare { first, rest } => {
                first.collect_names(names);
                for (_, operand) in rest {
                    operand.collect_names(names);
                }
            }
            Self::Power { base, exponent } => {
                base.collect_names(names);
                exponent.collect_names(names);
            }
            Self::And(operands) | Self::Or(operands) => {
                for operand in operands {
                    operand.collect_names(names);
                }
            }
            Self::Conditional {
                condition,
                then,
                otherwise,
            } => {
                then.collect_names(names);
                condition.collect_names(names);
                otherwise.collect_names(names);
            }
            Self::Call { args, .. } => {
                for arg in args {
                    arg.collect_names(names);
                }
            }
        }
    }
}
