//! Storage module for the .cws sheet format

mod parser;
mod writer;

pub use parser::{SavedContent, SavedEntry, SavedSheet, parse_sheet, parse_sheet_content};
pub use writer::{cell_order, write_sheet, write_sheet_content};
