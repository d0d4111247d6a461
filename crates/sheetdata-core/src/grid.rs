//! The immutable cell matrix a sheet is parsed from, and rectangular views
//! over it.
//!
//! A [`Grid`] owns the cell text of one sheet. Parsing never copies cells:
//! every stage works on a [`GridView`], a `Copy` window holding a reference
//! to the backing grid plus an offset and an extent. Sub-views are created
//! with [`GridView::slice`], which checks the requested bounds against the
//! parent view.

use thiserror::Error;

use crate::cell::CellRef;

/// A requested view does not fit inside its parent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "range rows {row_start}..={row_end}, columns {col_start}..={col_end} \
     is outside a view of {rows} rows and {cols} columns"
)]
pub struct RangeError {
    pub row_start: usize,
    pub col_start: usize,
    pub row_end: usize,
    pub col_end: usize,
    pub rows: usize,
    pub cols: usize,
}

/// A rectangular, row-major matrix of optional cell text.
///
/// Blank cells (empty or whitespace only) are stored as `None`, so callers
/// never need to distinguish "missing" from "empty".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    cells: Vec<Option<String>>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Build a grid from ragged rows, padding short rows with blank cells.
    ///
    /// ```
    /// use sheetdata_core::grid::Grid;
    ///
    /// let grid = Grid::from_rows(vec![vec!["[Design]"], vec!["Name", "Type"]]);
    /// assert_eq!(grid.row_count(), 2);
    /// assert_eq!(grid.col_count(), 2);
    /// assert_eq!(grid.view().cell(0, 1), None);
    /// ```
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| normalize(cell.into())).collect())
            .collect();
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let row_count = rows.len();

        let mut cells = Vec::with_capacity(row_count * cols);
        for mut row in rows {
            row.resize(cols, None);
            cells.extend(row);
        }

        Self {
            cells,
            rows: row_count,
            cols,
        }
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Returns a view spanning the whole grid.
    pub fn view(&self) -> GridView<'_> {
        GridView {
            grid: self,
            row0: 0,
            col0: 0,
            rows: self.rows,
            cols: self.cols,
        }
    }

    fn get(&self, row: usize, col: usize) -> Option<&str> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col].as_deref()
    }
}

fn normalize(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// A rectangular window over a [`Grid`].
///
/// Coordinates passed to a view are relative to its top-left corner.
/// Reads outside the extent return `None` rather than failing, matching how
/// a sparse sheet treats cells past its used range.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    grid: &'a Grid,
    row0: usize,
    col0: usize,
    rows: usize,
    cols: usize,
}

impl<'a> GridView<'a> {
    /// Returns the text of a cell, or `None` when it is blank or out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&'a str> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.grid.get(self.row0 + row, self.col0 + col)
    }

    /// Returns the number of rows in this view.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns in this view.
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Returns the absolute sheet coordinate of a view-relative cell.
    pub fn cell_ref(&self, row: usize, col: usize) -> CellRef {
        CellRef::new(self.row0 + row, self.col0 + col)
    }

    /// Returns the absolute sheet row of a view-relative row.
    pub fn absolute_row(&self, row: usize) -> usize {
        self.row0 + row
    }

    /// Create a sub-view covering rows `r0..=r1` and columns `c0..=c1`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] when the range is inverted or reaches past this
    /// view's extent.
    pub fn slice(&self, r0: usize, c0: usize, r1: usize, c1: usize) -> Result<Self, RangeError> {
        if r0 > r1 || c0 > c1 || r1 >= self.rows || c1 >= self.cols {
            return Err(RangeError {
                row_start: r0,
                col_start: c0,
                row_end: r1,
                col_end: c1,
                rows: self.rows,
                cols: self.cols,
            });
        }

        Ok(Self {
            grid: self.grid,
            row0: self.row0 + r0,
            col0: self.col0 + c0,
            rows: r1 - r0 + 1,
            cols: c1 - c0 + 1,
        })
    }

    /// Find the first row at or after `from` whose cell in `col` satisfies
    /// `predicate`.
    pub fn find_row<P>(&self, from: usize, col: usize, mut predicate: P) -> Option<usize>
    where
        P: FnMut(Option<&'a str>) -> bool,
    {
        (from..self.rows).find(|&row| predicate(self.cell(row, col)))
    }

    /// Iterate over the cells of one row, including blanks.
    pub fn row_cells(&self, row: usize) -> impl Iterator<Item = Option<&'a str>> + use<'a> {
        let view = *self;
        (0..view.cols).map(move |col| view.cell(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_rows(vec![
            vec!["a", "b", "c"],
            vec!["d", "", "f"],
            vec!["g", "h"],
            vec!["  ", "k", "l"],
        ])
    }

    #[test]
    fn test_from_rows_pads_and_normalizes() {
        let grid = sample();
        let view = grid.view();

        assert_eq!(view.row_count(), 4);
        assert_eq!(view.col_count(), 3);
        assert_eq!(view.cell(1, 1), None);
        assert_eq!(view.cell(2, 2), None);
        assert_eq!(view.cell(3, 0), None);
        assert_eq!(view.cell(3, 2), Some("l"));
    }

    #[test]
    fn test_cell_out_of_range_is_none() {
        let grid = sample();
        assert_eq!(grid.view().cell(10, 0), None);
        assert_eq!(grid.view().cell(0, 10), None);
    }

    #[test]
    fn test_slice_offsets_reads() {
        let grid = sample();
        let sub = grid.view().slice(1, 1, 3, 2).unwrap();

        assert_eq!(sub.row_count(), 3);
        assert_eq!(sub.col_count(), 2);
        assert_eq!(sub.cell(0, 1), Some("f"));
        assert_eq!(sub.cell(2, 0), Some("k"));
        assert_eq!(sub.cell(0, 2), None);
        assert_eq!(sub.cell_ref(2, 1).to_a1(), "C4");
    }

    #[test]
    fn test_slice_out_of_bounds_fails() {
        let grid = sample();
        let err = grid.view().slice(0, 0, 4, 2).unwrap_err();
        assert_eq!(err.rows, 4);

        assert!(grid.view().slice(2, 0, 1, 0).is_err());
        let sub = grid.view().slice(1, 0, 2, 1).unwrap();
        assert!(sub.slice(0, 0, 0, 2).is_err());
    }

    #[test]
    fn test_find_row() {
        let grid = sample();
        let view = grid.view();

        assert_eq!(view.find_row(0, 0, |c| c == Some("g")), Some(2));
        assert_eq!(view.find_row(3, 0, |c| c == Some("g")), None);
        assert_eq!(view.find_row(0, 1, |c: Option<&str>| c.is_none()), Some(1));
    }

    #[test]
    fn test_row_cells() {
        let grid = sample();
        let cells: Vec<_> = grid.view().row_cells(2).collect();
        assert_eq!(cells, vec![Some("g"), Some("h"), None]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn grid_strategy() -> impl Strategy<Value = Grid> {
        (1usize..8, 1usize..8).prop_flat_map(|(rows, cols)| {
            prop::collection::vec(
                prop::collection::vec(prop::option::of("[a-z]{1,3}"), cols),
                rows,
            )
            .prop_map(|rows| {
                Grid::from_rows(
                    rows.into_iter()
                        .map(|row| row.into_iter().map(Option::unwrap_or_default)),
                )
            })
        })
    }

    fn slice_strategy() -> impl Strategy<Value = (Grid, usize, usize, usize, usize)> {
        grid_strategy().prop_flat_map(|grid| {
            let rows = grid.row_count();
            let cols = grid.col_count();
            (0..rows, 0..cols).prop_flat_map(move |(r0, c0)| {
                let grid = grid.clone();
                (r0..rows, c0..cols).prop_map(move |(r1, c1)| (grid.clone(), r0, c0, r1, c1))
            })
        })
    }

    fn check_slice_matches_parent(
        grid: &Grid,
        r0: usize,
        c0: usize,
        r1: usize,
        c1: usize,
    ) -> Result<(), TestCaseError> {
        let parent = grid.view();
        let sub = parent
            .slice(r0, c0, r1, c1)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        for r in 0..sub.row_count() {
            for c in 0..sub.col_count() {
                prop_assert_eq!(sub.cell(r, c), parent.cell(r + r0, c + c0));
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn slice_reads_match_parent((grid, r0, c0, r1, c1) in slice_strategy()) {
            check_slice_matches_parent(&grid, r0, c0, r1, c1)?;
        }
    }
}
