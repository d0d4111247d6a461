//! Spreadsheet-style cell coordinates.
//!
//! Every diagnostic produced by the compiler points at a [`CellRef`]. The
//! wire format is the familiar A1 notation: a base-26 column label
//! (`A`..`Z`, `AA`, `AB`, ...) followed by a 1-indexed row number.

use std::fmt;

use thiserror::Error;

/// Errors produced when parsing an A1-style reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum A1ParseError {
    #[error("reference is empty")]
    Empty,

    #[error("reference has no column letters")]
    MissingColumn,

    #[error("reference has no row number")]
    MissingRow,

    #[error("row number must be 1 or greater")]
    InvalidRow,

    #[error("column label is too large")]
    InvalidColumn,

    #[error("unexpected characters after the row number")]
    TrailingCharacters,
}

/// A reference to a single cell of a sheet.
///
/// Rows and columns are **0-indexed**:
/// - `row = 0` is sheet row `1`
/// - `col = 0` is sheet column `A`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    row: usize,
    col: usize,
}

impl CellRef {
    /// Construct a new [`CellRef`] from 0-indexed coordinates.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the 0-indexed row.
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Returns the 0-indexed column.
    pub const fn col(&self) -> usize {
        self.col
    }

    /// Convert to A1 notation (e.g. `A1`, `C12`, `AA3`).
    pub fn to_a1(self) -> String {
        format!("{}{}", column_label(self.col), self.row + 1)
    }

    /// Parse an A1-style reference (e.g. `A1`, `$B$2`, `aa10`).
    ///
    /// Column letters are case-insensitive and optional `$` markers are
    /// accepted in front of the column and the row.
    ///
    /// # Errors
    ///
    /// Returns an [`A1ParseError`] describing the first malformed part.
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }

        let bytes = s.as_bytes();
        let mut idx = 0usize;
        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let col_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
            idx += 1;
        }
        if idx == col_start {
            return Err(A1ParseError::MissingColumn);
        }
        let col = column_index(&s[col_start..idx])?;

        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == row_start {
            return Err(A1ParseError::MissingRow);
        }
        if idx != bytes.len() {
            return Err(A1ParseError::TrailingCharacters);
        }

        let row_1_based: usize = s[row_start..idx]
            .parse()
            .map_err(|_| A1ParseError::InvalidRow)?;
        if row_1_based == 0 {
            return Err(A1ParseError::InvalidRow);
        }

        Ok(Self::new(row_1_based - 1, col))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Render a 0-indexed column as its base-26 letter label.
///
/// ```
/// use sheetdata_core::cell::column_label;
///
/// assert_eq!(column_label(0), "A");
/// assert_eq!(column_label(25), "Z");
/// assert_eq!(column_label(26), "AA");
/// assert_eq!(column_label(701), "ZZ");
/// ```
pub fn column_label(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn column_index(label: &str) -> Result<usize, A1ParseError> {
    let mut col: usize = 0;
    for b in label.bytes() {
        let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .ok_or(A1ParseError::InvalidColumn)?;
    }
    Ok(col - 1)
}
