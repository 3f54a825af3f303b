//! Error types for Cellwise core.

use cellwise_engine::engine::{Cycle, FormatError, GraphError};
use thiserror::Error;

/// Errors that abort a spreadsheet operation. The sheet is left unchanged.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid cell name '{0}'")]
    InvalidName(String),

    #[error("Missing {0}")]
    NullArgument(&'static str),

    #[error("Number {0} is not finite")]
    NonFiniteNumber(f64),

    #[error("Formula error: {0}")]
    Format(#[from] FormatError),

    #[error("Circular dependency detected at {cell}: {cycle}")]
    Circular { cell: String, cycle: Cycle },

    #[error("Dependency graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Version mismatch: expected '{expected}', found '{found}'")]
    VersionMismatch { expected: String, found: String },

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
