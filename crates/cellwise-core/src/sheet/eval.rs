use super::Spreadsheet;
use cellwise_engine::engine::{Contents, FormulaError, Value};

impl Spreadsheet {
    /// Recompute the values of `order`, front to back.
    ///
    /// `order` must list every cell after the cells it reads, as
    /// [`recalc_order`](cellwise_engine::engine::recalc_order) does. Names
    /// without a stored cell (just cleared) are skipped.
    pub(crate) fn recalculate(&mut self, order: &[String]) {
        for name in order {
            let Some(cell) = self.cells.get(name) else {
                continue;
            };
            let value = match &cell.contents {
                Contents::Number(n) => Value::Number(*n),
                Contents::Text(s) => Value::Text(s.clone()),
                Contents::Formula(f) => match f.evaluate(|var| self.lookup(var)) {
                    Ok(n) => Value::Number(n),
                    Err(e) => Value::Error(e),
                },
            };
            log::debug!("recalculated {} = {}", name, value);
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
    }

    /// Numeric value of a cell, as seen by formulas.
    pub(crate) fn lookup(&self, name: &str) -> Result<f64, FormulaError> {
        match self.cells.get(name).map(|c| &c.value) {
            Some(Value::Number(n)) => Ok(*n),
            Some(Value::Text(_)) => Err(FormulaError::NonNumeric {
                name: name.to_string(),
            }),
            Some(Value::Error(e)) => Err(FormulaError::Upstream {
                name: name.to_string(),
                reason: e.reason(),
            }),
            None => Err(FormulaError::UnknownVariable {
                name: name.to_string(),
            }),
        }
    }
}
