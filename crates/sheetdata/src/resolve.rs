//! Data materialization for one sheet.
//!
//! Resolution works directly on the schema's type graph:
//!
//! 1. [`TypeCatalog`] resolves every named type the sheet uses.
//! 2. The data section below the Design block is located.
//! 3. Each path cell compiles into a column plan.
//! 4. Each data row is materialized into a [`Value`] tree and its key is
//!    checked for uniqueness.
//!
//! Constants are evaluated from their `Value` cells in the same pass.

mod catalog;
mod constants;
mod convert;
mod execute;
mod plan;
mod section;

use log::info;

use sheetdata_core::{grid::GridView, schema::SheetSchema, value::Value};
use sheetdata_parser::{ParseConfig, error::Diagnostic};

pub use catalog::{RecordShape, ResolvedField, TypeCatalog};

/// Materialized data of one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    /// One value per data row, in sheet order; `None` without a Design block.
    pub rows: Option<Vec<Value>>,
    /// The constants record; `None` without a Constant block.
    pub constants: Option<Value>,
}

/// Materialize the data rows and constants of a sheet.
///
/// # Errors
///
/// Returns the first data error: missing or ambiguous markers (`E300`,
/// `E305`), invalid paths (`E301`), conversion failures (`E302`), blank
/// required cells (`E303`) or duplicate keys (`E304`).
pub fn resolve_data(
    schema: &SheetSchema,
    grid: GridView<'_>,
    catalog: &TypeCatalog<'_>,
    config: &ParseConfig,
) -> Result<SheetData, Diagnostic> {
    let rows = match (schema.design_entity(), catalog.entity()) {
        (Some(design), Some(entity)) => {
            let data = section::locate(grid, design.origin(), config)?;
            let plans = plan::compile(grid, data.path_row, entity, catalog, config)?;
            let key_fields: Vec<String> = design
                .key_fields()
                .map(|field| catalog.naming().public_variable(&field.name))
                .collect();
            let values =
                execute::materialize(grid, &data.rows, &plans, entity, &key_fields, catalog)?;
            info!(sheet = schema.sheet(), rows = values.len(); "Data rows materialized");
            Some(values)
        }
        _ => None,
    };

    let constants = match schema.constant() {
        Some((_, fields)) => Some(constants::evaluate(fields, catalog)?),
        None => None,
    };

    Ok(SheetData { rows, constants })
}
