//! Declarative binding of element header columns.
//!
//! Each block kind with an element table declares its columns once, as a
//! static slice of [`ElementField`]s. Binding matches the block's header row
//! against that slice; reading a row is then a column lookup.

use indexmap::IndexMap;
use log::trace;

use sheetdata_core::{cell::CellRef, grid::GridView};

use crate::{
    config::ParseConfig,
    error::{Diagnostic, ErrorCode, Result},
};

/// Row of the element header, relative to the block header.
const HEADER_ROW: usize = 1;
/// First element row, relative to the block header.
const FIRST_ELEMENT_ROW: usize = 2;

/// One column of a block's element table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ElementField {
    /// Canonical Pascal-cased header name.
    pub name: &'static str,
    /// The header column must be present.
    pub essential: bool,
    /// An essential column whose cells may be left blank.
    pub allows_empty: bool,
}

impl ElementField {
    pub const fn essential(name: &'static str) -> Self {
        Self {
            name,
            essential: true,
            allows_empty: false,
        }
    }

    pub const fn essential_or_empty(name: &'static str) -> Self {
        Self {
            name,
            essential: true,
            allows_empty: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            essential: false,
            allows_empty: true,
        }
    }
}

/// A block's element header row matched against its field table.
pub(crate) struct BoundColumns<'a> {
    view: GridView<'a>,
    fields: &'static [ElementField],
    /// Field name to view column.
    columns: IndexMap<&'static str, usize>,
}

impl<'a> BoundColumns<'a> {
    /// Match the header row of `view` against `fields`.
    ///
    /// # Errors
    ///
    /// - `E103` for a header cell naming no field, or naming one twice
    /// - `E102` when an essential field has no column
    pub fn bind(
        view: GridView<'a>,
        fields: &'static [ElementField],
        config: &ParseConfig,
    ) -> Result<Self> {
        let expected: Vec<(String, &'static ElementField)> = fields
            .iter()
            .map(|f| (config.input_name(f.name), f))
            .collect();

        let mut columns = IndexMap::new();
        for (col, cell) in view.row_cells(HEADER_ROW).enumerate() {
            let Some(text) = cell.map(str::trim) else {
                continue;
            };

            let Some((_, field)) = expected.iter().find(|(name, _)| name == text) else {
                let known: Vec<&str> = expected.iter().map(|(name, _)| name.as_str()).collect();
                return Err(Diagnostic::error(format!("unknown element header `{text}`"))
                    .with_code(ErrorCode::E103)
                    .with_label(view.cell_ref(HEADER_ROW, col), "not a column of this block")
                    .with_help(format!("expected one of: {}", known.join(", "))));
            };

            if let Some(first) = columns.insert(field.name, col) {
                return Err(Diagnostic::error(format!("element header `{text}` appears twice"))
                    .with_code(ErrorCode::E103)
                    .with_label(view.cell_ref(HEADER_ROW, col), "duplicate header")
                    .with_secondary_label(view.cell_ref(HEADER_ROW, first), "first used here"));
            }
        }

        if let Some((name, _)) = expected
            .iter()
            .find(|(_, field)| field.essential && !columns.contains_key(field.name))
        {
            return Err(Diagnostic::error(format!("missing element header `{name}`"))
                .with_code(ErrorCode::E102)
                .with_label(view.cell_ref(0, 0), "block declared here")
                .with_help(format!(
                    "add a `{name}` column to the row below the block header"
                )));
        }

        trace!(columns = columns.len(); "Bound element header");
        Ok(Self {
            view,
            fields,
            columns,
        })
    }

    /// Element rows, skipping blank and ignored rows.
    ///
    /// # Errors
    ///
    /// `E104` when an essential, non-empty column is blank in a row.
    pub fn rows<'b>(
        &'b self,
        config: &'b ParseConfig,
    ) -> impl Iterator<Item = Result<ElementRow<'a, 'b>>> + 'b {
        (FIRST_ELEMENT_ROW..self.view.row_count())
            .filter(move |&row| !config.is_ignored(self.view.cell(row, 0)))
            .map(move |row| self.element_row(row))
    }

    fn element_row<'b>(&'b self, row: usize) -> Result<ElementRow<'a, 'b>> {
        for field in self.fields.iter().filter(|f| f.essential && !f.allows_empty) {
            let Some(&col) = self.columns.get(field.name) else {
                continue;
            };
            if self.view.cell(row, col).is_none() {
                return Err(Diagnostic::error(format!("missing `{}` element", field.name))
                    .with_code(ErrorCode::E104)
                    .with_label(self.view.cell_ref(row, col), "this cell must not be blank"));
            }
        }
        Ok(ElementRow { bound: self, row })
    }
}

/// One element row of a bound block.
pub(crate) struct ElementRow<'a, 'b> {
    bound: &'b BoundColumns<'a>,
    row: usize,
}

impl ElementRow<'_, '_> {
    /// The cell text of a field, trimmed; `None` when blank or unbound.
    pub fn text(&self, field: &str) -> Option<&str> {
        let col = *self.bound.columns.get(field)?;
        self.bound.view.cell(self.row, col).map(str::trim)
    }

    /// The cell text of a field with surrounding whitespace kept.
    pub fn raw(&self, field: &str) -> Option<&str> {
        let col = *self.bound.columns.get(field)?;
        self.bound.view.cell(self.row, col)
    }

    /// The cell of a field, or the row's first cell when the field is unbound.
    pub fn cell_ref(&self, field: &str) -> CellRef {
        let col = self.bound.columns.get(field).copied().unwrap_or(0);
        self.bound.view.cell_ref(self.row, col)
    }

    /// The row's first cell.
    pub fn origin(&self) -> CellRef {
        self.bound.view.cell_ref(self.row, 0)
    }

    /// Read a boolean flag; blank is `false`.
    ///
    /// # Errors
    ///
    /// `E106` for text other than `true` or `false`.
    pub fn flag(&self, field: &str) -> Result<bool> {
        match self.text(field) {
            None => Ok(false),
            Some(text) if text.eq_ignore_ascii_case("true") => Ok(true),
            Some(text) if text.eq_ignore_ascii_case("false") => Ok(false),
            Some(text) => Err(Diagnostic::error(format!(
                "`{text}` is not a valid `{field}` value"
            ))
            .with_code(ErrorCode::E106)
            .with_label(self.cell_ref(field), "expected `true` or `false`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use sheetdata_core::{grid::Grid, notation::Notation};

    use super::*;

    const FIELDS: &[ElementField] = &[
        ElementField::essential("Name"),
        ElementField::essential_or_empty("IsPrimaryKey"),
        ElementField::optional("Comment"),
    ];

    fn grid(rows: Vec<Vec<&str>>) -> Grid {
        Grid::from_rows(rows)
    }

    #[test]
    fn test_bind_and_read_rows() {
        let grid = grid(vec![
            vec!["[Design]"],
            vec!["Name", "IsPrimaryKey", "Comment"],
            vec!["Id", "TRUE", "key"],
            vec![";Skipped", "", ""],
            vec![],
            vec!["Count", "", ""],
        ]);
        let config = ParseConfig::default();
        let bound = BoundColumns::bind(grid.view(), FIELDS, &config).unwrap();

        let rows: Vec<_> = bound.rows(&config).collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("Name"), Some("Id"));
        assert!(rows[0].flag("IsPrimaryKey").unwrap());
        assert!(!rows[1].flag("IsPrimaryKey").unwrap());
        assert_eq!(rows[1].text("Comment"), None);
        assert_eq!(rows[1].origin().to_a1(), "A6");
    }

    #[test]
    fn test_headers_use_input_notation() {
        let grid = grid(vec![vec!["[design]"], vec!["name", "is_primary_key"]]);
        let config = ParseConfig::default().with_input_notation(Notation::LowerSnake);

        assert!(BoundColumns::bind(grid.view(), FIELDS, &config).is_ok());
    }

    #[test]
    fn test_unknown_header() {
        let grid = grid(vec![vec!["[Design]"], vec!["Name", "IsPrimaryKey", "Kind"]]);
        let err = BoundColumns::bind(grid.view(), FIELDS, &ParseConfig::default())
            .err()
            .unwrap();

        assert_eq!(err.code(), Some(ErrorCode::E103));
        assert_eq!(err.primary_cell().unwrap().to_a1(), "C2");
    }

    #[test]
    fn test_missing_essential_header() {
        let grid = grid(vec![vec!["[Design]"], vec!["Name", "Comment"]]);
        let err = BoundColumns::bind(grid.view(), FIELDS, &ParseConfig::default())
            .err()
            .unwrap();

        assert_eq!(err.code(), Some(ErrorCode::E102));
        assert_eq!(err.primary_cell().unwrap().to_a1(), "A1");
    }

    #[test]
    fn test_blank_essential_cell() {
        let grid = grid(vec![
            vec!["[Design]", "", ""],
            vec!["Comment", "Name", "IsPrimaryKey"],
            vec!["note", "", "true"],
        ]);
        let config = ParseConfig::default();
        let bound = BoundColumns::bind(grid.view(), FIELDS, &config).unwrap();
        let err = bound.rows(&config).next().unwrap().err().unwrap();

        assert_eq!(err.code(), Some(ErrorCode::E104));
        assert_eq!(err.primary_cell().unwrap().to_a1(), "B3");
    }

    #[test]
    fn test_invalid_flag() {
        let grid = grid(vec![
            vec!["[Design]"],
            vec!["Name", "IsPrimaryKey"],
            vec!["Id", "yes"],
        ]);
        let config = ParseConfig::default();
        let bound = BoundColumns::bind(grid.view(), FIELDS, &config).unwrap();
        let row = bound.rows(&config).next().unwrap().unwrap();

        assert_eq!(
            row.flag("IsPrimaryKey").unwrap_err().code(),
            Some(ErrorCode::E106)
        );
    }
}
