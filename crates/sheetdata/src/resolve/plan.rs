//! Access path compilation.
//!
//! Each path cell below `[Name]` is split on `.`, `[` and `]` into field
//! and index steps, then walked against the entity's type graph. The result
//! is one [`ColumnPlan`] per used column.

use log::debug;

use sheetdata_core::{grid::GridView, schema::FieldType};
use sheetdata_parser::{
    ParseConfig,
    error::{Diagnostic, ErrorCode},
};

use super::catalog::{RecordShape, TypeCatalog};

/// Largest list index a path may name. Rows pad lists up to the index.
pub const MAX_LIST_INDEX: usize = 4095;

/// One step of an access path.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Descend into a record field, by emitted name.
    Field { name: String, ty: FieldType },
    /// Descend into a list element.
    Index { index: usize, ty: FieldType },
}

impl Step {
    /// The declared type of the slot this step reaches.
    pub fn ty(&self) -> &FieldType {
        match self {
            Step::Field { ty, .. } | Step::Index { ty, .. } => ty,
        }
    }
}

/// How one data column is written into a row value.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    pub col: usize,
    /// The path cell text, as written.
    pub path: String,
    pub steps: Vec<Step>,
    leaf: FieldType,
}

impl ColumnPlan {
    /// The type of the cell value.
    pub fn leaf(&self) -> &FieldType {
        &self.leaf
    }

    /// Returns `true` when any slot on the path is a list.
    pub fn crosses_list(&self) -> bool {
        self.steps.iter().any(|step| container(step.ty()).is_list())
    }

    /// Returns `true` when a blank cell leaves the value unset.
    pub fn allows_blank(&self) -> bool {
        self.crosses_list() || self.leaf().storage().is_nullable()
    }
}

/// The type a step descends into: nullability and references are
/// transparent.
pub fn container(ty: &FieldType) -> &FieldType {
    match ty {
        FieldType::Nullable(inner) => container(inner),
        FieldType::Reference { key, .. } => container(key),
        other => other,
    }
}

/// Compile the path row into column plans.
///
/// # Errors
///
/// Returns `E301` at the path cell when a segment names no field, indexes
/// a non-list or past [`MAX_LIST_INDEX`], or the path is empty.
pub fn compile(
    grid: GridView<'_>,
    path_row: usize,
    entity: &RecordShape,
    catalog: &TypeCatalog<'_>,
    config: &ParseConfig,
) -> Result<Vec<ColumnPlan>, Diagnostic> {
    let mut plans = Vec::new();
    for col in 0..grid.col_count() {
        let cell = grid.cell(path_row, col);
        if config.is_ignored(cell) {
            continue;
        }
        let Some(path) = cell else { continue };

        let (steps, leaf) = walk(path, entity, catalog).map_err(|reason| {
            Diagnostic::error(format!("invalid access path `{}`", path.trim()))
                .with_code(ErrorCode::E301)
                .with_label(grid.cell_ref(path_row, col), reason)
        })?;

        debug!(col, path = path.trim(), steps = steps.len(); "Column plan compiled");
        plans.push(ColumnPlan {
            col,
            path: path.trim().to_owned(),
            steps,
            leaf,
        });
    }
    Ok(plans)
}

fn walk(
    path: &str,
    entity: &RecordShape,
    catalog: &TypeCatalog<'_>,
) -> Result<(Vec<Step>, FieldType), String> {
    let segments: Vec<&str> = path
        .split(['.', '[', ']'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut steps: Vec<Step> = Vec::with_capacity(segments.len());
    for segment in segments {
        let current = steps.last().map(|step| container(step.ty()));

        if let Ok(index) = segment.parse::<usize>() {
            let Some(element) = current.and_then(FieldType::list_element) else {
                return Err(format!("`[{index}]` indexes a value that is not a list"));
            };
            if index > MAX_LIST_INDEX {
                return Err(format!(
                    "`[{index}]` is past the largest list index {MAX_LIST_INDEX}"
                ));
            }
            steps.push(Step::Index {
                index,
                ty: element.clone(),
            });
            continue;
        }

        let shape = match current {
            None => entity,
            Some(FieldType::Record(name)) => catalog
                .record(name)
                .ok_or_else(|| format!("record `{name}` is not defined"))?,
            Some(other) => {
                return Err(format!("`{segment}` is not a field of `{other}`"));
            }
        };
        let field = shape
            .field(segment, catalog.naming())
            .ok_or_else(|| format!("no field named `{segment}`"))?;
        steps.push(Step::Field {
            name: field.emitted.clone(),
            ty: field.ty.clone(),
        });
    }

    match steps.last() {
        Some(last) => {
            let leaf = last.ty().clone();
            Ok((steps, leaf))
        }
        None => Err("the path has no segments".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use sheetdata_core::{
        grid::Grid,
        notation::Notation,
        schema::{ScalarType, SheetSchema},
    };
    use sheetdata_parser::parse_sheet;

    use super::*;
    use crate::{config::NamingConfig, naming::Naming};

    fn schema() -> SheetSchema {
        let grid = Grid::from_rows(vec![
            vec!["[Record]", "ImageInfo"],
            vec!["Name", "Type"],
            vec!["AtlasName", "string"],
            vec!["Frames", "List<int>"],
            vec!["[Design]"],
            vec!["Name", "Type", "IsPrimaryKey"],
            vec!["Id", "int", "true"],
            vec!["Icon", "ImageInfo?", ""],
            vec!["Tags", "List<string>", ""],
            vec!["Level", "int", ""],
        ]);
        parse_sheet("Item", grid.view(), &ParseConfig::default()).unwrap()
    }

    fn compile_paths(paths: Vec<&str>) -> Result<Vec<ColumnPlan>, Diagnostic> {
        let schema = schema();
        let config = NamingConfig::default();
        let catalog =
            TypeCatalog::build(&schema, [], Naming::new(Notation::Pascal, &config)).unwrap();
        let grid = Grid::from_rows(vec![paths]);
        compile(
            grid.view(),
            0,
            catalog.entity().unwrap(),
            &catalog,
            &ParseConfig::default(),
        )
    }

    #[test]
    fn test_nested_and_indexed_paths() {
        let plans =
            compile_paths(vec!["Id", "Icon.AtlasName", "Tags[2]", "Icon.Frames[0]"]).unwrap();

        assert_eq!(plans.len(), 4);
        assert_eq!(
            plans[1].steps,
            vec![
                Step::Field {
                    name: "Icon".into(),
                    ty: FieldType::Nullable(Box::new(FieldType::Record("ImageInfo".into()))),
                },
                Step::Field {
                    name: "AtlasName".into(),
                    ty: FieldType::Scalar(ScalarType::String),
                },
            ]
        );
        assert_eq!(
            plans[2].steps[1],
            Step::Index {
                index: 2,
                ty: FieldType::Scalar(ScalarType::String),
            }
        );
        assert!(!plans[0].allows_blank());
        assert!(plans[2].allows_blank());
        assert!(plans[3].crosses_list());
    }

    #[test]
    fn test_list_index_limit() {
        let last = format!("Tags[{MAX_LIST_INDEX}]");
        let plans = compile_paths(vec!["Id", last.as_str()]).unwrap();
        assert_eq!(
            plans[1].steps[1],
            Step::Index {
                index: MAX_LIST_INDEX,
                ty: FieldType::Scalar(ScalarType::String),
            }
        );

        for path in ["Tags[4096]", "Tags[2000000]", "Icon.Frames[18446744073709551615]"] {
            let err = compile_paths(vec!["Id", path]).unwrap_err();
            assert_eq!(err.code(), Some(ErrorCode::E301), "{path}");
            assert_eq!(err.primary_cell().unwrap().to_a1(), "B1");
        }
    }

    #[test]
    fn test_ignored_and_blank_path_cells() {
        let plans = compile_paths(vec!["Id", "", "; memo", "Level"]).unwrap();

        let cols: Vec<_> = plans.iter().map(|p| p.col).collect();
        assert_eq!(cols, vec![0, 3]);
    }

    #[test]
    fn test_invalid_paths() {
        for path in ["Missing", "Level.Value", "Level[0]", "Icon.Name", "[]"] {
            let err = compile_paths(vec!["Id", path]).unwrap_err();
            assert_eq!(err.code(), Some(ErrorCode::E301), "{path}");
            assert_eq!(err.primary_cell().unwrap().to_a1(), "B1");
        }
    }
}
