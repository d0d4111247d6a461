//! Where sheet grids come from.
//!
//! The compiler only sees the [`SheetSource`] contract. [`MemorySource`] is
//! the in-process implementation used by tests and embedders; the CLI adds
//! a directory source over spreadsheet files.

use indexmap::IndexMap;
use log::debug;

use sheetdata_core::grid::Grid;

use crate::error::SheetError;

/// A provider of named sheet grids.
pub trait SheetSource {
    /// Names of every sheet, in a stable order.
    fn sheet_names(&self) -> Vec<String>;

    /// Returns the grid of one sheet.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::UnknownSheet`] for a name not in
    /// [`sheet_names`](Self::sheet_names), or a source-specific error when
    /// the sheet cannot be read.
    fn grid(&self, name: &str) -> Result<Grid, SheetError>;

    /// Re-reads the list of sheets.
    ///
    /// # Errors
    ///
    /// Returns a source-specific error when the listing fails.
    fn refresh(&mut self) -> Result<(), SheetError>;
}

/// Sheets held in memory, in insertion order.
///
/// ```
/// # use sheetdata::source::{MemorySource, SheetSource};
/// # use sheetdata_core::grid::Grid;
/// let source = MemorySource::new().with_sheet("Item", Grid::from_rows(vec![vec!["[Design]"]]));
/// assert_eq!(source.sheet_names(), vec!["Item".to_owned()]);
/// assert!(source.grid("Missing").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: IndexMap<String, Grid>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet, replacing any sheet with the same name.
    pub fn with_sheet(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.insert(name, grid);
        self
    }

    /// Adds a sheet and returns the grid it replaced.
    pub fn insert(&mut self, name: impl Into<String>, grid: Grid) -> Option<Grid> {
        self.sheets.insert(name.into(), grid)
    }
}

impl SheetSource for MemorySource {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn grid(&self, name: &str) -> Result<Grid, SheetError> {
        self.sheets
            .get(name)
            .cloned()
            .ok_or_else(|| SheetError::UnknownSheet(name.to_owned()))
    }

    fn refresh(&mut self) -> Result<(), SheetError> {
        debug!(sheets = self.sheets.len(); "Memory source refreshed");
        Ok(())
    }
}
