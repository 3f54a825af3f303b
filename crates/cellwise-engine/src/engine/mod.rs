//! Spreadsheet engine API.
//!
//! This module provides the computation pieces the spreadsheet is built from:
//!
//! - [`Cell`], [`Contents`], [`Value`] - Data structures for cell storage
//! - [`Formula`] - Validated infix formulas and their evaluation
//! - [`DependencyGraph`] - Bidirectional "depends on" relation between names
//! - [`recalc_order`] - Dependency-ordered traversal with cycle detection
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`format_number`] - Format values for display

mod cell;
mod cell_ref;
mod cycle;
mod error;
mod format;
mod formula;
mod graph;
mod token;

pub use cell::{Cell, Contents, Value};
pub use cell_ref::{CellRef, is_a1_name, is_identifier_name};
pub use cycle::{Cycle, recalc_order};
pub use error::{FormatError, FormulaError, GraphError};
pub use format::format_number;
pub use formula::Formula;
pub use graph::DependencyGraph;
pub use token::{Operator, Token};
