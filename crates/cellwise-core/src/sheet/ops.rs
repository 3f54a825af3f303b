use super::Spreadsheet;
use crate::error::{Result, SheetError};
use cellwise_engine::engine::{Cell, Contents, Formula, recalc_order};
use std::collections::BTreeSet;

/// An in-flight edit of one cell.
///
/// Holds the cell's previous state and dependee edges. Dropping the edit
/// without calling [`PendingEdit::commit`] puts both back.
struct PendingEdit<'a> {
    sheet: &'a mut Spreadsheet,
    name: String,
    prior_cell: Option<Cell>,
    prior_dependees: Vec<String>,
    committed: bool,
}

impl<'a> PendingEdit<'a> {
    fn begin(sheet: &'a mut Spreadsheet, name: &str) -> Self {
        let prior_cell = sheet.cells.get(name).cloned();
        let prior_dependees = sheet.graph.dependees(name).map(String::from).collect();
        PendingEdit {
            sheet,
            name: name.to_string(),
            prior_cell,
            prior_dependees,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingEdit<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match self.prior_cell.take() {
            Some(cell) => {
                self.sheet.cells.insert(self.name.clone(), cell);
            }
            None => {
                self.sheet.cells.remove(&self.name);
            }
        }
        if let Err(e) = self
            .sheet
            .graph
            .replace_dependees(&self.name, &self.prior_dependees)
        {
            log::error!("failed to restore dependencies of {}: {}", self.name, e);
        }
    }
}

impl Spreadsheet {
    /// Set a cell from user input and recalculate everything that depends on it.
    ///
    /// - Input that parses as a finite number -> Number
    /// - Starts with '=' -> Formula (the rest is parsed)
    /// - Empty string -> clears the cell
    /// - Otherwise -> Text
    ///
    /// Returns the recalculated cells, starting with `name`, each listed after
    /// every cell it depends on. On error the sheet is unchanged.
    pub fn set_cell(&mut self, name: &str, text: &str) -> Result<Vec<String>> {
        let name = self.canonical_name(name)?;
        let contents = self.classify(text)?;
        self.assign(name, contents)
    }

    /// [`set_cell`](Self::set_cell) for callers whose arguments may be absent.
    pub fn set_cell_opt(&mut self, name: Option<&str>, text: Option<&str>) -> Result<Vec<String>> {
        let name = name.ok_or_else(|| SheetError::InvalidName(String::new()))?;
        let name = self.canonical_name(name)?;
        let text = text.ok_or(SheetError::NullArgument("cell content"))?;
        let contents = self.classify(text)?;
        self.assign(name, contents)
    }

    pub fn set_number(&mut self, name: &str, number: f64) -> Result<Vec<String>> {
        let name = self.canonical_name(name)?;
        if !number.is_finite() {
            return Err(SheetError::NonFiniteNumber(number));
        }
        self.assign(name, Contents::Number(number))
    }

    /// Store `text` verbatim, even if it looks like a number or formula.
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<Vec<String>> {
        let name = self.canonical_name(name)?;
        self.assign(name, Contents::Text(text.to_string()))
    }

    /// Store a formula. Its variables are re-checked against this sheet's
    /// normalizer and validator.
    pub fn set_formula(&mut self, name: &str, formula: &Formula) -> Result<Vec<String>> {
        let name = self.canonical_name(name)?;
        let formula = self.parse_formula(formula.to_canonical_string())?;
        self.assign(name, Contents::Formula(formula))
    }

    fn parse_formula(&self, expr: &str) -> Result<Formula> {
        Ok(Formula::parse_with(expr, &self.normalize, &self.is_valid)?)
    }

    fn classify(&self, text: &str) -> Result<Contents> {
        if let Some(expr) = text.strip_prefix('=') {
            return Ok(Contents::Formula(self.parse_formula(expr)?));
        }
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Contents::Number(n)),
            _ => Ok(Contents::Text(text.to_string())),
        }
    }

    /// Install `contents` at the canonical `name`, all or nothing.
    fn assign(&mut self, name: String, contents: Contents) -> Result<Vec<String>> {
        let dependees: BTreeSet<String> = match &contents {
            Contents::Formula(f) => f.variables(),
            _ => BTreeSet::new(),
        };

        let order = {
            let edit = PendingEdit::begin(self, &name);
            edit.sheet.graph.replace_dependees(&name, &dependees)?;
            if contents.is_empty() {
                edit.sheet.cells.remove(&name);
            } else {
                edit.sheet.cells.insert(name.clone(), Cell::new(contents));
            }

            match recalc_order(&edit.sheet.graph, &name) {
                Ok(order) => {
                    edit.commit();
                    order
                }
                Err(cycle) => {
                    log::warn!("rejected edit of {}: circular dependency {}", name, cycle);
                    return Err(SheetError::Circular { cell: name, cycle });
                }
            }
        };

        self.recalculate(&order);
        self.modified = true;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellwise_engine::engine::{FormulaError, Value};

    fn sheet() -> Spreadsheet {
        Spreadsheet::with_validators(|_| true, |s| s.to_ascii_uppercase(), "test")
    }

    #[test]
    fn test_classify_input() {
        let mut s = sheet();
        s.set_cell("A1", "5").unwrap();
        s.set_cell("A2", " 2.5e1 ").unwrap();
        s.set_cell("A3", "hello").unwrap();
        s.set_cell("A4", "=A1 * 2").unwrap();
        s.set_cell("A5", "inf").unwrap();

        assert_eq!(s.contents("A1").unwrap(), Contents::Number(5.0));
        assert_eq!(s.contents("A2").unwrap(), Contents::Number(25.0));
        assert_eq!(s.contents("A3").unwrap(), Contents::Text("hello".into()));
        assert_eq!(
            s.contents("A4").unwrap(),
            Contents::Formula(Formula::new("A1*2").unwrap())
        );
        assert_eq!(s.contents("A5").unwrap(), Contents::Text("inf".into()));
        assert_eq!(s.value("A4").unwrap(), Value::Number(10.0));
    }

    #[test]
    fn test_names_are_normalized() {
        let mut s = sheet();
        s.set_cell("a1", "1").unwrap();
        s.set_cell("b1", "=a1 + 1").unwrap();
        assert_eq!(s.value("B1").unwrap(), Value::Number(2.0));
        assert_eq!(s.direct_dependents("A1").unwrap(), vec!["B1"]);
        assert_eq!(s.contents("b1").unwrap().to_input_string(), "=A1+1");
    }

    #[test]
    fn test_invalid_name() {
        let mut s = Spreadsheet::with_validators(|n| n.len() < 4, |s| s.to_string(), "v");
        assert!(matches!(s.set_cell("1A", "1"), Err(SheetError::InvalidName(_))));
        assert!(matches!(s.set_cell("", "1"), Err(SheetError::InvalidName(_))));
        assert!(matches!(s.set_cell("ABCD", "1"), Err(SheetError::InvalidName(_))));
        assert!(matches!(s.contents("a b"), Err(SheetError::InvalidName(_))));
        assert!(s.is_empty());
    }

    #[test]
    fn test_formula_variable_rejected_by_validator() {
        let mut s = Spreadsheet::with_validators(|n| n.starts_with('A'), |s| s.to_string(), "v");
        let err = s.set_cell("A1", "=B1 + 1").unwrap_err();
        assert!(matches!(err, SheetError::Format(_)));
        assert!(!s.is_modified());
    }

    #[test]
    fn test_optional_arguments() {
        let mut s = sheet();
        assert!(matches!(s.set_cell_opt(None, Some("1")), Err(SheetError::InvalidName(_))));
        assert!(matches!(s.set_cell_opt(Some("A1"), None), Err(SheetError::NullArgument(_))));
        assert_eq!(s.set_cell_opt(Some("A1"), Some("1")).unwrap(), vec!["A1"]);
    }

    #[test]
    fn test_typed_setters() {
        let mut s = sheet();
        s.set_number("A1", 4.0).unwrap();
        s.set_text("A2", "12").unwrap();
        let f = Formula::new("a1 / 2").unwrap();
        s.set_formula("A3", &f).unwrap();

        assert_eq!(s.contents("A2").unwrap(), Contents::Text("12".into()));
        assert_eq!(s.contents("A3").unwrap().to_input_string(), "=A1/2");
        assert_eq!(s.value("A3").unwrap(), Value::Number(2.0));
        assert!(matches!(
            s.set_number("A4", f64::NAN),
            Err(SheetError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn test_format_error_leaves_cell_unchanged() {
        let mut s = sheet();
        s.set_cell("A1", "7").unwrap();
        assert!(matches!(s.set_cell("A1", "=5 +"), Err(SheetError::Format(_))));
        assert_eq!(s.contents("A1").unwrap(), Contents::Number(7.0));
    }

    #[test]
    fn test_cycle_restores_previous_formula() {
        let mut s = sheet();
        s.set_cell("A1", "=B1 + 1").unwrap();
        s.set_cell("B1", "3").unwrap();
        let err = s.set_cell("B1", "=A1").unwrap_err();
        assert!(matches!(err, SheetError::Circular { .. }));
        assert_eq!(s.contents("B1").unwrap(), Contents::Number(3.0));
        assert_eq!(s.value("A1").unwrap(), Value::Number(4.0));
        assert_eq!(s.graph.dependee_count("B1"), 0);
    }

    #[test]
    fn test_self_reference_on_new_cell() {
        let mut s = sheet();
        assert!(matches!(s.set_cell("A1", "=A1"), Err(SheetError::Circular { .. })));
        assert!(s.is_empty());
        assert!(s.graph.is_empty());
    }

    #[test]
    fn test_clearing_a_read_cell_errors_its_dependents() {
        let mut s = sheet();
        s.set_cell("A1", "2").unwrap();
        s.set_cell("B1", "=A1").unwrap();
        assert_eq!(s.set_cell("A1", "").unwrap(), vec!["A1", "B1"]);
        assert_eq!(
            s.value("B1").unwrap(),
            Value::Error(FormulaError::UnknownVariable { name: "A1".into() })
        );
        assert_eq!(s.non_empty_cells().collect::<Vec<_>>(), vec!["B1"]);
    }
}
