//! Contents parser: block discovery over a sheet grid.
//!
//! The scan walks the first column top to bottom. A cell starting with `[`
//! opens a block; its tag selects a reader from the block registry. The
//! reserved `Name` and `Data` markers end the scan because the rows from
//! there on belong to the data section of the Design block.

use std::collections::HashMap;

use log::{debug, info};

use sheetdata_core::{
    cell::CellRef,
    grid::GridView,
    schema::{BlockKind, SheetSchema},
};

use crate::{
    blocks::{self, header_tokens},
    config::ParseConfig,
    error::{Diagnostic, ErrorCode, ParseError},
};

/// Canonical tag of the data path row marker.
pub const NAME_MARKER: &str = "Name";
/// Canonical tag of the data row marker.
pub const DATA_MARKER: &str = "Data";

/// Returns `true` if a cell opens a block or marker.
pub fn is_header(cell: Option<&str>) -> bool {
    cell.is_some_and(|text| text.trim_start().starts_with('['))
}

/// The canonical Pascal tag of a header cell.
///
/// Returns `None` when the cell is not a header or carries no tag.
pub fn header_tag(cell: Option<&str>, config: &ParseConfig) -> Option<String> {
    if !is_header(cell) {
        return None;
    }
    let tokens = header_tokens(cell?);
    tokens.first().map(|tag| config.canonical_name(tag))
}

/// Parse a sheet grid into its schema.
///
/// # Errors
///
/// Returns the first structural or schema error as a [`ParseError`]:
/// unknown (`E100`) or duplicate (`E101`) blocks and every error raised by
/// the block readers.
///
/// # Example
///
/// ```
/// use sheetdata_core::grid::Grid;
/// use sheetdata_parser::{ParseConfig, parse_sheet};
///
/// let grid = Grid::from_rows(vec![
///     vec!["[Design]"],
///     vec!["Name", "Type", "IsPrimaryKey"],
///     vec!["Id", "int", "true"],
///     vec!["Name", "string", ""],
/// ]);
/// let schema = parse_sheet("Item", grid.view(), &ParseConfig::default()).unwrap();
/// assert_eq!(schema.design_entity().unwrap().key_fields().count(), 1);
/// ```
pub fn parse_sheet(
    sheet: &str,
    grid: GridView<'_>,
    config: &ParseConfig,
) -> Result<SheetSchema, ParseError> {
    info!(sheet; "Parsing sheet");

    let mut blocks = Vec::new();
    let mut unique: HashMap<BlockKind, CellRef> = HashMap::new();
    let mut row = 0;

    while row < grid.row_count() {
        let first = grid.cell(row, 0);
        if !is_header(first) {
            row += 1;
            continue;
        }

        let cell = grid.cell_ref(row, 0);
        let Some(tag) = header_tag(first, config) else {
            return Err(unknown_block(cell, "").into());
        };
        if tag == NAME_MARKER || tag == DATA_MARKER {
            debug!(sheet, row; "Reached data section");
            break;
        }

        let entry = blocks::lookup(&tag).ok_or_else(|| unknown_block(cell, &tag))?;
        if !entry.allow_multiple {
            if let Some(first) = unique.insert(entry.kind, cell) {
                return Err(Diagnostic::error(format!(
                    "`{}` block appears more than once",
                    entry.kind
                ))
                .with_code(ErrorCode::E101)
                .with_label(cell, "duplicate block")
                .with_secondary_label(first, "first declared here")
                .into());
            }
        }

        let end = grid
            .find_row(row + 1, 0, is_header)
            .unwrap_or(grid.row_count());
        let view = grid
            .slice(row, 0, end - 1, grid.col_count() - 1)
            .map_err(|err| Diagnostic::error(err.to_string()).with_label(cell, "block"))?;

        blocks.push(blocks::read_block(entry, view, config)?);
        row = end;
    }

    debug!(sheet, blocks = blocks.len(); "Sheet parsed");
    Ok(SheetSchema::new(sheet, blocks))
}

fn unknown_block(cell: CellRef, tag: &str) -> Diagnostic {
    Diagnostic::error(format!("unknown block type `{tag}`"))
        .with_code(ErrorCode::E100)
        .with_label(cell, "unrecognized block header")
        .with_help(
            "expected one of: Description, Enum, Record, Interface, Constant, Design, Name, Data",
        )
}

#[cfg(test)]
mod tests {
    use sheetdata_core::notation::Notation;

    use super::*;

    #[test]
    fn test_is_header() {
        assert!(is_header(Some("[Design]")));
        assert!(is_header(Some("  [Enum:Global]")));
        assert!(!is_header(Some("Design")));
        assert!(!is_header(None));
    }

    #[test]
    fn test_header_tag_canonicalizes() {
        let config = ParseConfig::default().with_input_notation(Notation::LowerSnake);

        assert_eq!(header_tag(Some("[enum:global]"), &config), Some("Enum".into()));
        assert_eq!(header_tag(Some("[]"), &config), None);
        assert_eq!(header_tag(Some("name"), &config), None);
    }
}
