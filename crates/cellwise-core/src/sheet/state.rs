use crate::config::Settings;
use crate::error::{Result, SheetError};
use crate::storage::cell_order;
use cellwise_engine::engine::{Cell, Contents, DependencyGraph, Value, is_identifier_name};
use std::collections::HashMap;
use std::fmt;

/// Maps a raw cell or variable name to its canonical form.
pub type Normalizer = Box<dyn Fn(&str) -> String + Send + Sync>;
/// Decides whether a canonical name is acceptable.
pub type Validator = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A sparse sheet of named cells.
///
/// Every legal name addresses a cell; only cells with non-empty contents
/// are stored. All names are normalized on the way in, so the store, the
/// dependency graph and formula variables agree on one spelling.
///
/// Edits are not synchronized. Callers sharing a sheet across threads must
/// serialize access themselves (e.g. behind a `Mutex`).
pub struct Spreadsheet {
    /// Non-empty cells by canonical name
    pub(crate) cells: HashMap<String, Cell>,
    /// Edge (a, b) means b's formula reads a
    pub(crate) graph: DependencyGraph,
    pub(crate) normalize: Normalizer,
    pub(crate) is_valid: Validator,
    /// Tag written to and expected from saved files
    pub(crate) version: String,
    /// Whether the sheet has changed since it was last saved or loaded
    pub(crate) modified: bool,
}

impl Spreadsheet {
    /// An empty sheet with no normalization, accepting every identifier name,
    /// and the version tag `"default"`.
    pub fn new() -> Self {
        Self::with_validators(|_| true, |s| s.to_string(), "default")
    }

    /// An empty sheet with caller-supplied name validation and normalization.
    pub fn with_validators<V, N>(is_valid: V, normalize: N, version: impl Into<String>) -> Self
    where
        V: Fn(&str) -> bool + Send + Sync + 'static,
        N: Fn(&str) -> String + Send + Sync + 'static,
    {
        Spreadsheet {
            cells: HashMap::new(),
            graph: DependencyGraph::new(),
            normalize: Box::new(normalize),
            is_valid: Box::new(is_valid),
            version: version.into(),
            modified: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Spreadsheet {
            cells: HashMap::new(),
            graph: DependencyGraph::new(),
            normalize: settings.normalizer(),
            is_valid: settings.validator(),
            version: settings.version.clone(),
            modified: false,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Names of all cells with non-empty contents, in no particular order.
    pub fn non_empty_cells(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Names of all non-empty cells in save order (A1 names row-major first).
    pub fn sorted_cells(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.non_empty_cells().collect();
        names.sort_by(|a, b| cell_order(a, b));
        names
    }

    /// Contents of a cell; empty text when the cell has never been set.
    pub fn contents(&self, name: &str) -> Result<Contents> {
        let name = self.canonical_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map_or_else(Contents::empty, |c| c.contents.clone()))
    }

    /// Value of a cell; empty text when the cell has never been set.
    pub fn value(&self, name: &str) -> Result<Value> {
        let name = self.canonical_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map_or_else(Value::empty, |c| c.value.clone()))
    }

    /// Cells whose formulas read `name` directly, sorted.
    pub fn direct_dependents(&self, name: &str) -> Result<Vec<String>> {
        let name = self.canonical_name(name)?;
        let mut dependents: Vec<String> = self.graph.dependents(&name).map(String::from).collect();
        dependents.sort_unstable();
        Ok(dependents)
    }

    /// Normalize `name` and check it against the identifier grammar and the validator.
    pub(crate) fn canonical_name(&self, name: &str) -> Result<String> {
        let normalized = (self.normalize)(name);
        if is_identifier_name(&normalized) && (self.is_valid)(&normalized) {
            Ok(normalized)
        } else {
            Err(SheetError::InvalidName(name.to_string()))
        }
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("cells", &self.cells)
            .field("graph", &self.graph)
            .field("version", &self.version)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}
