//! Cell data structures.
//!
//! This module provides the data types a sheet stores per cell:
//! - [`Contents`] - What was assigned: a number, text, or formula
//! - [`Value`] - What the contents compute to: a number, text, or error
//! - [`Cell`] - Contents together with the current value

use std::fmt;

use super::error::FormulaError;
use super::format::format_number;
use super::formula::Formula;

/// The literal assignment of a cell.
///
/// An empty cell has `Text("")` contents; sheets never store such a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Contents {
    Number(f64),
    Text(String),
    Formula(Formula),
}

impl Contents {
    pub fn empty() -> Contents {
        Contents::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Contents::Text(t) if t.is_empty())
    }

    /// The text that, written back into the cell, reproduces these contents.
    /// Formulas are rendered canonically with a leading `=`.
    pub fn to_input_string(&self) -> String {
        match self {
            Contents::Number(n) => n.to_string(),
            Contents::Text(s) => s.clone(),
            Contents::Formula(f) => format!("={}", f),
        }
    }
}

impl fmt::Display for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_input_string())
    }
}

/// The computed result of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl Value {
    pub fn empty() -> Value {
        Value::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Text(t) if t.is_empty())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&FormulaError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Error(e) => write!(f, "#ERR: {}", e),
        }
    }
}

/// A stored cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub contents: Contents,
    pub value: Value,
}

impl Cell {
    /// Create a cell whose value mirrors literal contents.
    /// Formula cells start with an empty value until they are evaluated.
    pub fn new(contents: Contents) -> Cell {
        let value = match &contents {
            Contents::Number(n) => Value::Number(*n),
            Contents::Text(s) => Value::Text(s.clone()),
            Contents::Formula(_) => Value::empty(),
        };
        Cell { contents, value }
    }
}
