//! Writer for the .cws file format

use crate::error::Result;
use cellwise_engine::engine::{CellRef, Contents};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

/// Write cells to a .cws file
pub fn write_sheet<'a, I>(path: &Path, version: &str, cells: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a Contents)>,
{
    let content = write_sheet_content(version, cells);
    fs::write(path, content)?;
    Ok(())
}

/// Write cells to a .cws format string, in [`cell_order`]. Empty contents are skipped.
pub fn write_sheet_content<'a, I>(version: &str, cells: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Contents)>,
{
    let mut lines = vec![
        "# Cellwise Spreadsheet".to_string(),
        format!("@version {}", version),
    ];

    let mut cells: Vec<(&str, &Contents)> = cells.into_iter().collect();
    cells.sort_by(|(a, _), (b, _)| cell_order(a, b));

    for (name, contents) in cells {
        let value_str = match contents {
            Contents::Text(s) if s.is_empty() => continue,
            Contents::Number(n) => n.to_string(),
            Contents::Text(s) => format!("\"{}\"", escape_text(s)),
            Contents::Formula(f) => format!("={}", f),
        };
        lines.push(format!("{}: {}", name, value_str));
    }

    lines.join("\n") + "\n"
}

/// Save order: A1-style names row-major, then everything else alphabetically.
pub fn cell_order(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn sort_key(name: &str) -> (bool, Option<CellRef>, &str) {
    let cell_ref = CellRef::from_str(name);
    (cell_ref.is_none(), cell_ref, name)
}

fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}
