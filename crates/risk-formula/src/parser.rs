// Recursive-descent parser for formula programs.
//
// Grammar (lowest to highest precedence):
//   program     := statement (SEP statement)*
//   statement   := NAME '=' expression | expression
//   expression  := or_expr ('if' or_expr 'else' expression)?
//   or_expr     := and_expr ('or' and_expr)*
//   and_expr    := not_expr ('and' not_expr)*
//   not_expr    := 'not' not_expr | comparison
//   comparison  := sum (CMP sum)*
//   sum         := term (('+' | '-') term)*
//   term        := unary (('*' | '/' | '//' | '%') unary)*
//   unary       := ('-' | '+') unary | power
//   power       := primary ('**' unary)?
//   primary     := NUMBER | STRING | True | False | NAME | NAME '(' args ')' | '(' expression ')'

use crate::ast::{BinaryOp, CompareOp, Expr, Program, Stmt, UnaryOp};
use crate::error::{FormulaError, Result};
use crate::lexer::{Spanned, Token, tokenize};

pub(crate) fn parse(source: &str, max_depth: usize) -> Result<Program> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        max_depth,
        end: source.len(),
    };
    parser.program()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
    max_depth: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|spanned| &spanned.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|spanned| &spanned.token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.end, |spanned| spanned.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|spanned| spanned.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> FormulaError {
        match self.peek() {
            Some(token) => FormulaError::parse(
                self.position(),
                format!("expected {what}, found {}", describe(token)),
            ),
            None => FormulaError::parse(self.end, format!("expected {what}, found end of formula")),
        }
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep {
                limit: self.max_depth,
            });
        }
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn skip_separators(&mut self) {
        while self.eat(&Token::Separator) {}
    }

    fn program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();
        self.skip_separators();
        while self.peek().is_some() {
            statements.push(self.statement()?);
            if self.peek().is_some() {
                self.expect(&Token::Separator, "end of statement")?;
            }
            self.skip_separators();
        }
        if statements.is_empty() {
            return Err(FormulaError::parse(0, "formula is empty"));
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt> {
        if let (Some(Token::Ident(name)), Some(Token::Assign)) = (self.peek(), self.peek_at(1)) {
            if name.contains('.') {
                return Err(FormulaError::parse(
                    self.position(),
                    format!("cannot assign to '{name}'"),
                ));
            }
            let name = name.clone();
            self.pos += 2;
            let value = self.expression()?;
            return Ok(Stmt::Assign { name, value });
        }
        if self.peek() == Some(&Token::Assign) {
            return Err(self.unexpected("expression"));
        }
        Ok(Stmt::Expr(self.expression()?))
    }

    fn expression(&mut self) -> Result<Expr> {
        self.nested(|parser| {
            let then = parser.or_expr()?;
            if !parser.eat(&Token::If) {
                return Ok(then);
            }
            let condition = parser.or_expr()?;
            parser.expect(&Token::Else, "'else'")?;
            let otherwise = parser.expression()?;
            Ok(Expr::Conditional {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            })
        })
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let first = self.and_expr()?;
        if self.peek() != Some(&Token::Or) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat(&Token::Or) {
            operands.push(self.and_expr()?);
        }
        Ok(Expr::Or(operands))
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let first = self.not_expr()?;
        if self.peek() != Some(&Token::And) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat(&Token::And) {
            operands.push(self.not_expr()?);
        }
        Ok(Expr::And(operands))
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.eat(&Token::Not) {
            let operand = self.nested(Self::not_expr)?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr> {
        let first = self.sum()?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek().and_then(compare_op) {
            self.pos += 1;
            rest.push((op, self.sum()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn sum(&mut self) -> Result<Expr> {
        self.chain(Self::term, |token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expr> {
        self.chain(Self::unary, |token| match token {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::SlashSlash => Some(BinaryOp::FloorDiv),
            Token::Percent => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    fn chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr>,
        operator: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr> {
        let first = operand(self)?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek().and_then(operator) {
            self.pos += 1;
            rest.push((op, operand(self)?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Chain {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Pos,
            _ => return self.power(),
        };
        self.pos += 1;
        let operand = self.nested(Self::unary)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        if !self.eat(&Token::StarStar) {
            return Ok(base);
        }
        let exponent = self.nested(Self::unary)?;
        Ok(Expr::Power {
            base: Box::new(base),
            exponent: Box::new(exponent),
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        let position = self.position();
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Str(text)) => Ok(Expr::Text(text)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Name(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(token) => Err(FormulaError::parse(
                position,
                format!("expected a value, found {}", describe(&token)),
            )),
            None => Err(FormulaError::parse(
                self.end,
                "expected a value, found end of formula",
            )),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&Token::Comma) {
                // Trailing comma
                if self.eat(&Token::RParen) {
                    return Ok(args);
                }
                continue;
            }
            self.expect(&Token::RParen, "',' or ')'")?;
            return Ok(args);
        }
    }
}

fn compare_op(token: &Token) -> Option<CompareOp> {
    match token {
        Token::EqEq => Some(CompareOp::Eq),
        Token::NotEq => Some(CompareOp::NotEq),
        Token::Lt => Some(CompareOp::Lt),
        Token::LtEq => Some(CompareOp::LtEq),
        Token::Gt => Some(CompareOp::Gt),
        Token::GtEq => Some(CompareOp::GtEq),
        _ => None,
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(value) => format!("number {value}"),
        Token::Str(text) => format!("string '{text}'"),
        Token::Ident(name) => format!("name '{name}'"),
        Token::Separator => "end of statement".to_string(),
        other => format!("{other:?}"),
    }
}
