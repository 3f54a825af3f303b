//! cellwise-core - UI-agnostic spreadsheet model + storage.

pub mod config;
pub mod error;
pub mod sheet;
pub mod storage;

pub use config::{NameStyle, Normalization, Settings};
pub use error::{Result, SheetError};
pub use sheet::{Normalizer, Spreadsheet, Validator};

pub use cellwise_engine::engine::{CellRef, Contents, Formula, FormulaError, Value};
