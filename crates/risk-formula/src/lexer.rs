// Formula tokenizer.
// Supports: numbers (1, 1.5, .5, 1e-3), quoted strings, names (incl. dotted
// `math.exp`), keywords, arithmetic/comparison operators, `;` and newlines
// as statement separators, `#` comments and `\` line continuations.

use crate::error::{FormulaError, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    // Keywords
    And,
    Or,
    Not,
    If,
    Else,
    True,
    False,
    // Arithmetic
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // Punctuation
    Assign,
    LParen,
    RParen,
    Comma,
    Separator,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let mut tokens: Vec<Spanned> = Vec::new();
    let mut chars = input.char_indices().peekable();
    let mut paren_depth = 0usize;

    while let Some(&(position, c)) = chars.peek() {
        let push = |tokens: &mut Vec<Spanned>, token| tokens.push(Spanned { token, position });
        match c {
            ' ' | '\t' | '\r' => {
                chars.next();
            }
            '#' => {
                while chars.peek().is_some_and(|&(_, ch)| ch != '\n') {
                    chars.next();
                }
            }
            '\\' => {
                chars.next();
                while chars.peek().is_some_and(|&(_, ch)| ch == ' ' || ch == '\t' || ch == '\r') {
                    chars.next();
                }
                match chars.next() {
                    Some((_, '\n')) => {}
                    _ => return Err(FormulaError::parse(position, "stray '\\'")),
                }
            }
            '\n' | ';' => {
                chars.next();
                // Newlines inside parentheses only continue the expression.
                if c == ';' || paren_depth == 0 {
                    push(&mut tokens, Token::Separator);
                }
            }
            '+' => {
                chars.next();
                push(&mut tokens, Token::Plus);
            }
            '-' => {
                chars.next();
                push(&mut tokens, Token::Minus);
            }
            '*' => {
                chars.next();
                if chars.next_if(|&(_, ch)| ch == '*').is_some() {
                    push(&mut tokens, Token::StarStar);
                } else {
                    push(&mut tokens, Token::Star);
                }
            }
            '/' => {
                chars.next();
                if chars.next_if(|&(_, ch)| ch == '/').is_some() {
                    push(&mut tokens, Token::SlashSlash);
                } else {
                    push(&mut tokens, Token::Slash);
                }
            }
            '%' => {
                chars.next();
                push(&mut tokens, Token::Percent);
            }
            '(' => {
                chars.next();
                paren_depth += 1;
                push(&mut tokens, Token::LParen);
            }
            ')' => {
                chars.next();
                paren_depth = paren_depth.saturating_sub(1);
                push(&mut tokens, Token::RParen);
            }
            ',' => {
                chars.next();
                push(&mut tokens, Token::Comma);
            }
            '=' => {
                chars.next();
                if chars.next_if(|&(_, ch)| ch == '=').is_some() {
                    push(&mut tokens, Token::EqEq);
                } else {
                    push(&mut tokens, Token::Assign);
                }
            }
            '!' => {
                chars.next();
                if chars.next_if(|&(_, ch)| ch == '=').is_some() {
                    push(&mut tokens, Token::NotEq);
                } else {
                    return Err(FormulaError::parse(position, "expected '=' after '!'"));
                }
            }
            '<' => {
                chars.next();
                if chars.next_if(|&(_, ch)| ch == '=').is_some() {
                    push(&mut tokens, Token::LtEq);
                } else {
                    push(&mut tokens, Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.next_if(|&(_, ch)| ch == '=').is_some() {
                    push(&mut tokens, Token::GtEq);
                } else {
                    push(&mut tokens, Token::Gt);
                }
            }
            '"' | '\'' => {
                chars.next();
                let text = read_string(&mut chars, c, position)?;
                push(&mut tokens, Token::Str(text));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' || ch == '_' {
                        literal.push(ch);
                        chars.next();
                    } else if (ch == 'e' || ch == 'E') && !literal.contains(['e', 'E']) {
                        literal.push(ch);
                        chars.next();
                        if let Some((_, sign)) = chars.next_if(|&(_, s)| s == '+' || s == '-') {
                            literal.push(sign);
                        }
                    } else {
                        break;
                    }
                }
                let value = literal
                    .replace('_', "")
                    .parse::<f64>()
                    .map_err(|_| FormulaError::parse(position, format!("invalid number '{literal}'")))?;
                push(&mut tokens, Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if ident.ends_with('.') || ident.contains("..") {
                    return Err(FormulaError::parse(position, format!("invalid name '{ident}'")));
                }
                let token = match ident.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "if" => Token::If,
                    "else" => Token::Else,
                    "True" | "true" => Token::True,
                    "False" | "false" => Token::False,
                    _ => Token::Ident(ident),
                };
                push(&mut tokens, token);
            }
            other => {
                return Err(FormulaError::parse(
                    position,
                    format!("unexpected character '{other}'"),
                ));
            }
        }
    }

    Ok(tokens)
}

fn read_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    quote: char,
    start: usize,
) -> Result<String> {
    let mut text = String::new();
    loop {
        match chars.next() {
            Some((_, ch)) if ch == quote => return Ok(text),
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, escaped)) => text.push(escaped),
                None => break,
            },
            Some((_, '\n')) | None => break,
            Some((_, ch)) => text.push(ch),
        }
    }
    Err(FormulaError::parse(start, "unterminated string"))
}
