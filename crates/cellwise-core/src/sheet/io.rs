use super::Spreadsheet;
use crate::config::Settings;
use crate::error::{Result, SheetError};
use crate::storage::{
    SavedContent, SavedSheet, parse_sheet, parse_sheet_content, write_sheet, write_sheet_content,
};
use cellwise_engine::engine::Contents;
use std::path::Path;

impl Spreadsheet {
    /// Open a saved sheet using `settings` for names and the expected version.
    pub fn open(path: &Path, settings: &Settings) -> Result<Self> {
        let mut sheet = Self::from_settings(settings);
        sheet.load_file(path)?;
        Ok(sheet)
    }

    /// Version tag recorded in a saved file.
    pub fn saved_version(path: &Path) -> Result<String> {
        Ok(parse_sheet(path)?.version)
    }

    /// Write all non-empty cells to `path` and clear the modified flag.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        write_sheet(path, &self.version, self.saved_cells())?;
        self.modified = false;
        Ok(())
    }

    /// The saved form of the sheet, as [`save`](Self::save) would write it.
    pub fn to_saved_string(&self) -> String {
        write_sheet_content(&self.version, self.saved_cells())
    }

    /// Replace the sheet's cells with those saved at `path`.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let saved = parse_sheet(path)?;
        self.replace_with(saved)
    }

    /// Replace the sheet's cells with those in saved-format `content`.
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let saved = parse_sheet_content(content)?;
        self.replace_with(saved)
    }

    fn saved_cells(&self) -> impl Iterator<Item = (&str, &Contents)> {
        self.cells
            .iter()
            .map(|(name, cell)| (name.as_str(), &cell.contents))
    }

    /// Replay `saved` into an emptied sheet. On failure the previous cells
    /// are put back.
    fn replace_with(&mut self, saved: SavedSheet) -> Result<()> {
        if saved.version != self.version {
            return Err(SheetError::VersionMismatch {
                expected: self.version.clone(),
                found: saved.version,
            });
        }

        let old_cells = std::mem::take(&mut self.cells);
        let old_graph = std::mem::take(&mut self.graph);
        let old_modified = self.modified;

        for entry in &saved.entries {
            let applied = match &entry.content {
                SavedContent::Text(text) => self.set_text(&entry.name, text),
                SavedContent::Input(input) => self.set_cell(&entry.name, input),
            };
            if let Err(e) = applied {
                self.cells = old_cells;
                self.graph = old_graph;
                self.modified = old_modified;
                return Err(SheetError::Parse {
                    line: entry.line,
                    message: format!("{}: {}", entry.name, e),
                });
            }
        }

        log::debug!("loaded {} cells", self.cells.len());
        self.modified = false;
        Ok(())
    }
}
