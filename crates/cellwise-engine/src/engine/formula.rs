//! Infix formulas.
//!
//! A [`Formula`] is validated once, when it is built: parentheses balance,
//! every token is recognized, and each token may legally follow the one
//! before it. Evaluation therefore only has to deal with semantic failures
//! (unknown variables, division by zero), which it reports as
//! [`FormulaError`] values.
//!
//! # Examples
//!
//! ```
//! use cellwise_engine::engine::Formula;
//!
//! let f = Formula::parse_with("a1 + 2.00", |s| s.to_uppercase(), |_| true).unwrap();
//! assert_eq!(f.to_string(), "A1+2");
//! assert_eq!(f.evaluate_with(|_| Some(3.0)), Ok(5.0));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::error::{FormatError, FormulaError};
use super::token::{self, Operator, Token};

/// A syntactically valid infix formula.
///
/// Equality and hashing use the canonical string, so `x+y` and `x + y` are
/// equal while `x+y` and `y+x` are not.
#[derive(Clone, Debug)]
pub struct Formula {
    tokens: Vec<Token>,
    canonical: String,
}

impl Formula {
    /// Parse with no normalization and no extra variable validation.
    pub fn new(text: &str) -> Result<Formula, FormatError> {
        Self::parse_with(text, |s| s.to_string(), |_| true)
    }

    /// Parse `text`, passing every variable through `normalize` and then `is_valid`.
    pub fn parse_with<N, V>(text: &str, normalize: N, is_valid: V) -> Result<Formula, FormatError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        let lexemes = token::lex(text);
        if lexemes.is_empty() {
            return Err(FormatError::Empty);
        }

        let mut tokens = Vec::with_capacity(lexemes.len());
        for (index, lexeme) in lexemes.iter().enumerate() {
            let token = Token::classify(lexeme).ok_or_else(|| FormatError::UnrecognizedToken {
                index,
                token: lexeme.to_string(),
            })?;
            let token = match token {
                Token::Variable(name) => {
                    let normalized = normalize(&name);
                    if !token::is_variable(&normalized) || !is_valid(&normalized) {
                        return Err(FormatError::InvalidVariable {
                            index,
                            token: lexeme.to_string(),
                        });
                    }
                    Token::Variable(normalized)
                }
                Token::Number(n) if !n.is_finite() => {
                    return Err(FormatError::InvalidNumber {
                        index,
                        token: lexeme.to_string(),
                    });
                }
                other => other,
            };
            tokens.push(token);
        }

        validate(&tokens)?;

        let canonical = tokens.iter().map(Token::to_string).collect();
        Ok(Formula { tokens, canonical })
    }

    /// The token sequence, after normalization and numeric canonicalization.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Distinct variables referenced by the formula.
    pub fn variables(&self) -> BTreeSet<String> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Variable(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// The canonical rendering: tokens concatenated without whitespace.
    pub fn to_canonical_string(&self) -> &str {
        &self.canonical
    }

    /// Evaluate using a lookup that reports missing variables as `None`.
    pub fn evaluate_with<F>(&self, mut lookup: F) -> Result<f64, FormulaError>
    where
        F: FnMut(&str) -> Option<f64>,
    {
        self.evaluate(|name| {
            lookup(name).ok_or_else(|| FormulaError::UnknownVariable {
                name: name.to_string(),
            })
        })
    }

    /// Evaluate with the classic operand/operator two-stack algorithm.
    ///
    /// A failing `lookup` aborts evaluation and its error becomes the result.
    pub fn evaluate<F>(&self, mut lookup: F) -> Result<f64, FormulaError>
    where
        F: FnMut(&str) -> Result<f64, FormulaError>,
    {
        let mut values: Vec<f64> = Vec::new();
        let mut pending: Vec<Pending> = Vec::new();

        for token in &self.tokens {
            match token {
                Token::Number(n) => push_operand(*n, &mut values, &mut pending)?,
                Token::Variable(name) => {
                    let value = lookup(name)?;
                    push_operand(value, &mut values, &mut pending)?;
                }
                Token::Operator(op) if op.is_additive() => {
                    reduce_additive(&mut values, &mut pending)?;
                    pending.push(Pending::Op(*op));
                }
                Token::Operator(op) => pending.push(Pending::Op(*op)),
                Token::LeftParen => pending.push(Pending::Paren),
                Token::RightParen => {
                    reduce_additive(&mut values, &mut pending)?;
                    match pending.pop() {
                        Some(Pending::Paren) => {}
                        _ => return Err(FormulaError::Malformed("expected '('".to_string())),
                    }
                    if let Some(Pending::Op(op)) = pending.last().copied()
                        && !op.is_additive()
                    {
                        pending.pop();
                        let (left, right) = pop_pair(&mut values)?;
                        values.push(apply(left, right, op)?);
                    }
                }
            }
        }

        match (pending.as_slice(), values.as_slice()) {
            ([], [value]) => Ok(*value),
            ([Pending::Op(op)], [left, right]) if op.is_additive() => apply(*left, *right, *op),
            _ => Err(FormulaError::Malformed(format!(
                "{} operands and {} operators left after evaluation",
                values.len(),
                pending.len()
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Pending {
    Op(Operator),
    Paren,
}

fn push_operand(
    value: f64,
    values: &mut Vec<f64>,
    pending: &mut Vec<Pending>,
) -> Result<(), FormulaError> {
    if let Some(Pending::Op(op)) = pending.last().copied()
        && !op.is_additive()
    {
        pending.pop();
        let left = values.pop().ok_or_else(|| {
            FormulaError::Malformed(format!("'{}' is missing its left operand", op.symbol()))
        })?;
        values.push(apply(left, value, op)?);
    } else {
        values.push(value);
    }
    Ok(())
}

fn reduce_additive(values: &mut Vec<f64>, pending: &mut Vec<Pending>) -> Result<(), FormulaError> {
    if let Some(Pending::Op(op)) = pending.last().copied()
        && op.is_additive()
    {
        pending.pop();
        let (left, right) = pop_pair(values)?;
        values.push(apply(left, right, op)?);
    }
    Ok(())
}

fn pop_pair(values: &mut Vec<f64>) -> Result<(f64, f64), FormulaError> {
    match (values.pop(), values.pop()) {
        (Some(right), Some(left)) => Ok((left, right)),
        _ => Err(FormulaError::Malformed(
            "operator needs two operands".to_string(),
        )),
    }
}

fn apply(left: f64, right: f64, op: Operator) -> Result<f64, FormulaError> {
    match op {
        Operator::Add => Ok(left + right),
        Operator::Sub => Ok(left - right),
        Operator::Mul => Ok(left * right),
        Operator::Div if right == 0.0 => Err(FormulaError::DivideByZero),
        Operator::Div => Ok(left / right),
    }
}

/// Structural checks over a classified token sequence.
fn validate(tokens: &[Token]) -> Result<(), FormatError> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(FormatError::Empty);
    };
    if !(first.is_operand() || *first == Token::LeftParen) {
        return Err(FormatError::InvalidFirstToken {
            token: first.to_string(),
        });
    }
    if !(last.is_operand() || *last == Token::RightParen) {
        return Err(FormatError::InvalidLastToken {
            token: last.to_string(),
        });
    }

    let mut open = 0usize;
    let mut close = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::LeftParen => open += 1,
            Token::RightParen => {
                close += 1;
                if close > open {
                    return Err(FormatError::UnmatchedClose { index });
                }
            }
            _ => {}
        }

        if index == 0 {
            continue;
        }
        let previous = &tokens[index - 1];
        let allowed = match previous {
            // After an opener we need something that starts a value.
            Token::LeftParen | Token::Operator(_) => token.is_operand() || *token == Token::LeftParen,
            // After a value we need something that continues or closes it.
            Token::Number(_) | Token::Variable(_) | Token::RightParen => {
                matches!(token, Token::Operator(_) | Token::RightParen)
            }
        };
        if !allowed {
            return Err(FormatError::UnexpectedToken {
                index,
                token: token.to_string(),
                previous: previous.to_string(),
            });
        }
    }

    if open != close {
        return Err(FormatError::UnbalancedParens { open, close });
    }
    Ok(())
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl FromStr for Formula {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn eval(text: &str) -> Result<f64, FormulaError> {
        Formula::new(text).unwrap().evaluate_with(|_| Some(1.0))
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(eval("5 + 3"), Ok(8.0));
        assert_eq!(eval("  1     -     3 "), Ok(-2.0));
        assert_eq!(eval("5*3"), Ok(15.0));
        assert_eq!(eval("5 / 2"), Ok(2.5));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("5 + 2 * 3 + 5"), Ok(16.0));
        assert_eq!(eval("5 * (3 + 4) - 2 + (6*(2+3))"), Ok(63.0));
        assert_eq!(eval("(4 * 3 + 5) / (1 + 2 - 1)"), Ok(8.5));
        let nested = eval("(50 + 3-(123 / 5) * 3 +(5 * 1) - 15) * 7").unwrap();
        assert!((nested - -215.6).abs() < 1e-9);
        assert_eq!(eval("10 - 4 - 3"), Ok(3.0));
        assert_eq!(eval("8 / 4 / 2"), Ok(1.0));
    }

    #[test]
    fn test_variables_from_lookup() {
        let vars: HashMap<&str, f64> = [("A1", 2.0), ("asdf1234", 4.0)].into_iter().collect();
        let f = Formula::new("5+A1-asdf1234").unwrap();
        assert_eq!(f.evaluate_with(|name| vars.get(name).copied()), Ok(3.0));
    }

    #[test]
    fn test_unknown_variable_is_a_value() {
        let f = Formula::new("5 + b123").unwrap();
        assert_eq!(
            f.evaluate_with(|_| None),
            Err(FormulaError::UnknownVariable { name: "b123".into() })
        );
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(eval("5 / 0"), Err(FormulaError::DivideByZero));
        assert_eq!(eval("(2+6)/0"), Err(FormulaError::DivideByZero));
        assert_eq!(eval("(5 / (1 - 1))"), Err(FormulaError::DivideByZero));
        let f = Formula::new("5 / p0").unwrap();
        assert_eq!(f.evaluate_with(|_| Some(0.0)), Err(FormulaError::DivideByZero));
    }

    #[test]
    fn test_format_errors() {
        assert_eq!(Formula::new(""), Err(FormatError::Empty));
        assert_eq!(Formula::new("   "), Err(FormatError::Empty));
        assert!(matches!(Formula::new(" * 5"), Err(FormatError::InvalidFirstToken { .. })));
        assert!(matches!(Formula::new("+ 5 + 3"), Err(FormatError::InvalidFirstToken { .. })));
        assert!(matches!(Formula::new("5 * 10 +"), Err(FormatError::InvalidLastToken { .. })));
        assert!(matches!(Formula::new("/"), Err(FormatError::InvalidFirstToken { .. })));
        assert!(matches!(Formula::new("(4+ )"), Err(FormatError::UnexpectedToken { index: 3, .. })));
        assert_eq!(Formula::new("5 + 3)"), Err(FormatError::UnmatchedClose { index: 3 }));
        assert!(matches!(Formula::new("5 10"), Err(FormatError::UnexpectedToken { index: 1, .. })));
        assert!(matches!(Formula::new("x y"), Err(FormatError::UnexpectedToken { .. })));
        assert!(matches!(Formula::new("2(3)"), Err(FormatError::UnexpectedToken { .. })));
        assert_eq!(
            Formula::new("((1)"),
            Err(FormatError::UnbalancedParens { open: 2, close: 1 })
        );
        assert_eq!(
            Formula::new("5 $ 3"),
            Err(FormatError::UnrecognizedToken { index: 1, token: "$".into() })
        );
        assert!(matches!(Formula::new("1e400"), Err(FormatError::InvalidNumber { .. })));
    }

    #[test]
    fn test_is_valid_rejects_variable_by_position() {
        let err = Formula::parse_with("1 + bad", |s| s.to_string(), |s| s != "bad").unwrap_err();
        assert_eq!(err, FormatError::InvalidVariable { index: 2, token: "bad".into() });
    }

    #[test]
    fn test_normalizer_must_produce_a_variable() {
        let err = Formula::parse_with("x", |_| "1x".to_string(), |_| true).unwrap_err();
        assert!(matches!(err, FormatError::InvalidVariable { index: 0, .. }));
    }

    #[test]
    fn test_canonical_string() {
        assert_eq!(Formula::new("5 + 5").unwrap().to_string(), "5+5");
        assert_eq!(Formula::new("1e2 + 2e2").unwrap().to_string(), "100+200");
        let lower = Formula::parse_with("A + b + _L1", |s| s.to_lowercase(), |_| true).unwrap();
        assert_eq!(lower.to_string(), "a+b+_l1");
    }

    #[test]
    fn test_equality_uses_canonical_form() {
        let f = Formula::new("A + 5      - 2.00").unwrap();
        let g = Formula::parse_with("B+5-2", |_| "A".to_string(), |_| true).unwrap();
        assert_eq!(f, g);
        assert_ne!(Formula::new("x+y").unwrap(), Formula::new("y+x").unwrap());
    }

    #[test]
    fn test_variables_are_deduplicated() {
        let f = Formula::new("A_ + 5 + _ * A_").unwrap();
        let vars = f.variables();
        assert_eq!(vars.len(), 2);
        assert!(vars.contains("A_") && vars.contains("_"));
    }

    #[test]
    fn test_from_str() {
        let f: Formula = "(1)+2".parse().unwrap();
        assert_eq!(f.to_canonical_string(), "(1)+2");
    }
}
