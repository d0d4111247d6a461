//! Locating the data section of a Design sheet.
//!
//! ```text
//! [Name]
//! Id    Icon.AtlasName   Tags[0]     <- path row
//! [Data]                             <- only when data markers are enabled
//! 1     atlas_a          red         <- data rows
//! ```

use log::debug;

use sheetdata_core::{cell::CellRef, grid::GridView};
use sheetdata_parser::{
    DATA_MARKER, NAME_MARKER, ParseConfig,
    error::{Diagnostic, ErrorCode},
    header_tag,
};

/// Rows of the data section, relative to the sheet grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSection {
    pub path_row: usize,
    /// Data rows in sheet order, ignored rows already skipped.
    pub rows: Vec<usize>,
}

fn is_marker(cell: Option<&str>, marker: &str, config: &ParseConfig) -> bool {
    header_tag(cell, config).is_some_and(|tag| tag == marker)
}

/// Find the path row and the data rows below the Design block.
///
/// # Errors
///
/// - `E300` when the `[Name]` row or its path row is missing, or when data
///   markers are enabled and no `[Data]` row follows
/// - `E305` when non-ignored rows sit between the path row and `[Data]`, or
///   when a `[Data]` row appears although data markers are disabled
pub fn locate(
    grid: GridView<'_>,
    design_origin: CellRef,
    config: &ParseConfig,
) -> Result<DataSection, Diagnostic> {
    let Some(name_row) = grid.find_row(design_origin.row(), 0, |cell| {
        is_marker(cell, NAME_MARKER, config)
    }) else {
        return Err(Diagnostic::error("the Design block has no `[Name]` row")
            .with_code(ErrorCode::E300)
            .with_label(design_origin, "Design block declared here")
            .with_help(format!(
                "add a `[{}]` row followed by a row of field paths",
                config.input_name(NAME_MARKER)
            )));
    };

    let path_row = name_row + 1;
    if path_row >= grid.row_count() {
        return Err(Diagnostic::error("the `[Name]` row has no path row below it")
            .with_code(ErrorCode::E300)
            .with_label(grid.cell_ref(name_row, 0), "`[Name]` marker"));
    }

    let data_marker = grid.find_row(path_row + 1, 0, |cell| {
        is_marker(cell, DATA_MARKER, config)
    });

    let first_data_row = if config.use_data_marker() {
        let Some(marker_row) = data_marker else {
            return Err(Diagnostic::error("the data section has no `[Data]` row")
                .with_code(ErrorCode::E300)
                .with_label(grid.cell_ref(name_row, 0), "data section starts here")
                .with_help("add a `[Data]` row above the data rows, or disable data markers"));
        };
        if let Some(stray) =
            (path_row + 1..marker_row).find(|&row| !config.is_ignored(grid.cell(row, 0)))
        {
            return Err(Diagnostic::error("rows between the path row and `[Data]`")
                .with_code(ErrorCode::E305)
                .with_label(grid.cell_ref(stray, 0), "neither a path nor a data row")
                .with_secondary_label(grid.cell_ref(marker_row, 0), "`[Data]` marker"));
        }
        marker_row + 1
    } else {
        if let Some(marker_row) = data_marker {
            return Err(Diagnostic::error("`[Data]` row found but data markers are disabled")
                .with_code(ErrorCode::E305)
                .with_label(grid.cell_ref(marker_row, 0), "unexpected marker")
                .with_help("remove the row, or enable `use_data_marker`"));
        }
        path_row + 1
    };

    let rows: Vec<usize> = (first_data_row..grid.row_count())
        .filter(|&row| !config.is_ignored(grid.cell(row, 0)))
        .collect();

    debug!(path_row, data_rows = rows.len(); "Data section located");
    Ok(DataSection { path_row, rows })
}

#[cfg(test)]
mod tests {
    use sheetdata_core::grid::Grid;

    use super::*;

    fn design_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["[Design]"],
            vec!["Name", "Type", "IsPrimaryKey"],
            vec!["Id", "int", "true"],
            vec![],
        ]
    }

    fn locate_rows(
        tail: Vec<Vec<&'static str>>,
        config: &ParseConfig,
    ) -> Result<DataSection, Diagnostic> {
        let mut rows = design_rows();
        rows.extend(tail);
        let grid = Grid::from_rows(rows);
        locate(grid.view(), CellRef::new(0, 0), config)
    }

    #[test]
    fn test_locate_with_data_marker() {
        let section = locate_rows(
            vec![
                vec!["[Name]"],
                vec!["Id"],
                vec!["; notes"],
                vec!["[Data]"],
                vec!["1"],
                vec![""],
                vec!["; skipped"],
                vec!["2"],
            ],
            &ParseConfig::default(),
        )
        .unwrap();

        assert_eq!(section.path_row, 5);
        assert_eq!(section.rows, vec![8, 11]);
    }

    #[test]
    fn test_locate_without_data_marker() {
        let config = ParseConfig::default().with_data_marker(false);
        let section = locate_rows(vec![vec!["[Name]"], vec!["Id"], vec!["1"]], &config).unwrap();

        assert_eq!(section.rows, vec![6]);
    }

    #[test]
    fn test_missing_markers() {
        let err = locate_rows(vec![], &ParseConfig::default()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E300));
        assert_eq!(err.primary_cell(), Some(CellRef::new(0, 0)));

        let err = locate_rows(vec![vec!["[Name]"]], &ParseConfig::default()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E300));

        let err =
            locate_rows(vec![vec!["[Name]"], vec!["Id"], vec!["1"]], &ParseConfig::default())
                .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E300));
    }

    #[test]
    fn test_ambiguous_sections() {
        let err = locate_rows(
            vec![vec!["[Name]"], vec!["Id"], vec!["1"], vec!["[Data]"], vec!["2"]],
            &ParseConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E305));
        assert_eq!(err.primary_cell().unwrap().to_a1(), "A7");

        let config = ParseConfig::default().with_data_marker(false);
        let err = locate_rows(vec![vec!["[Name]"], vec!["Id"], vec!["[Data]"]], &config)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E305));
    }
}
