//! Error types for the engine.

use thiserror::Error;

/// Syntax errors found while constructing a [`Formula`](super::Formula).
///
/// Token indices are zero-based positions in the token sequence, not byte offsets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("formula contains no tokens")]
    Empty,

    #[error("formula cannot start with '{token}'")]
    InvalidFirstToken { token: String },

    #[error("formula cannot end with '{token}'")]
    InvalidLastToken { token: String },

    #[error("unrecognized token '{token}' at index {index}")]
    UnrecognizedToken { index: usize, token: String },

    #[error("number '{token}' at index {index} is out of range")]
    InvalidNumber { index: usize, token: String },

    #[error("variable '{token}' at index {index} is not valid")]
    InvalidVariable { index: usize, token: String },

    #[error("'{token}' at index {index} cannot follow '{previous}'")]
    UnexpectedToken {
        index: usize,
        token: String,
        previous: String,
    },

    #[error("closing parenthesis at index {index} has no matching '('")]
    UnmatchedClose { index: usize },

    #[error("{open} opening parentheses but {close} closing")]
    UnbalancedParens { open: usize, close: usize },
}

/// Evaluation failures. These are values: a cell holding a formula that
/// fails to evaluate stores one of these as its value.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormulaError {
    #[error("variable {name} has no value")]
    UnknownVariable { name: String },

    #[error("variable {name} is not a number")]
    NonNumeric { name: String },

    #[error("variable {name} has an error: {reason}")]
    Upstream { name: String, reason: String },

    #[error("division by zero")]
    DivideByZero,

    #[error("malformed expression: {0}")]
    Malformed(String),
}

impl FormulaError {
    /// Human-readable reason, suitable for display in a cell.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Errors from [`DependencyGraph`](super::DependencyGraph) mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("dependency graph keys must not be empty")]
    EmptyKey,
}
