//! Formula tokenization.
//!
//! Splits formula text into lexemes (parentheses, the four arithmetic
//! operators, variables, and decimal literals with optional exponent) and
//! classifies them. Text that no token pattern covers is kept as its own
//! lexeme so the parser can report it by position.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// One of the four binary arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// True for `+` and `-`, the low-precedence operators.
    pub fn is_additive(self) -> bool {
        matches!(self, Operator::Add | Operator::Sub)
    }
}

/// A classified formula token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    LeftParen,
    RightParen,
    Operator(Operator),
    Number(f64),
    Variable(String),
}

impl Token {
    /// Classify a single lexeme. Returns `None` for text no token pattern matches.
    pub(crate) fn classify(lexeme: &str) -> Option<Token> {
        match lexeme {
            "(" => return Some(Token::LeftParen),
            ")" => return Some(Token::RightParen),
            "+" => return Some(Token::Operator(Operator::Add)),
            "-" => return Some(Token::Operator(Operator::Sub)),
            "*" => return Some(Token::Operator(Operator::Mul)),
            "/" => return Some(Token::Operator(Operator::Div)),
            _ => {}
        }
        if variable_re().is_match(lexeme) {
            return Some(Token::Variable(lexeme.to_string()));
        }
        if number_re().is_match(lexeme) {
            return lexeme.parse::<f64>().ok().map(Token::Number);
        }
        None
    }

    /// Tokens that produce a value: numbers and variables.
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::Number(n) => write!(f, "{}", n),
            Token::Variable(name) => f.write_str(name),
        }
    }
}

/// Split formula text into lexemes, discarding whitespace.
pub(crate) fn lex(text: &str) -> Vec<&str> {
    let mut lexemes = Vec::new();
    let mut last = 0;

    for m in lexeme_re().find_iter(text) {
        if m.start() > last {
            lexemes.push(&text[last..m.start()]);
        }
        if !m.as_str().trim().is_empty() {
            lexemes.push(m.as_str());
        }
        last = m.end();
    }
    if last < text.len() {
        lexemes.push(&text[last..]);
    }

    lexemes
}

/// Whether `name` matches the variable grammar `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_variable(name: &str) -> bool {
    variable_re().is_match(name)
}

fn lexeme_re() -> &'static Regex {
    static LEXEME_RE: OnceLock<Regex> = OnceLock::new();
    LEXEME_RE.get_or_init(|| {
        Regex::new(
            r"\(|\)|[+\-*/]|[A-Za-z_][A-Za-z0-9_]*|(?:[0-9]+\.[0-9]*|[0-9]*\.[0-9]+|[0-9]+)(?:[eE][+\-]?[0-9]+)?|\s+",
        )
        .expect("lexeme regex must compile")
    })
}

fn variable_re() -> &'static Regex {
    static VARIABLE_RE: OnceLock<Regex> = OnceLock::new();
    VARIABLE_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("variable regex must compile")
    })
}

fn number_re() -> &'static Regex {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_RE.get_or_init(|| {
        Regex::new(r"^(?:[0-9]+\.[0-9]*|[0-9]*\.[0-9]+|[0-9]+)(?:[eE][+\-]?[0-9]+)?$")
            .expect("number regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_discards_whitespace() {
        assert_eq!(lex("  1     -     3 "), vec!["1", "-", "3"]);
    }

    #[test]
    fn test_lex_scientific_notation() {
        assert_eq!(lex("1e2+2.5E-3"), vec!["1e2", "+", "2.5E-3"]);
    }

    #[test]
    fn test_lex_keeps_unrecognized_text() {
        assert_eq!(lex("5 $ 3"), vec!["5", "$", "3"]);
        assert_eq!(lex("a1#"), vec!["a1", "#"]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Token::classify("("), Some(Token::LeftParen));
        assert_eq!(Token::classify("/"), Some(Token::Operator(Operator::Div)));
        assert_eq!(Token::classify("_x9"), Some(Token::Variable("_x9".into())));
        assert_eq!(Token::classify(".5"), Some(Token::Number(0.5)));
        assert_eq!(Token::classify("$"), None);
    }

    #[test]
    fn test_number_display_is_canonical() {
        assert_eq!(Token::Number(2.0).to_string(), "2");
        assert_eq!(Token::Number(100.0).to_string(), "100");
        assert_eq!(Token::Number(0.25).to_string(), "0.25");
    }
}
