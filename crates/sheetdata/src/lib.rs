//! Sheetdata - compiles schema sheets into C# source and JSON data
//!
//! A sheet is a grid of text cells declaring enums, records, interfaces,
//! constants and one Design entity, followed by the entity's data rows. This
//! library parses those declarations, materializes the data rows against the
//! declared types, and renders both the generated types and the data.

pub mod config;
pub mod source;

mod error;
mod export;
mod naming;
mod resolve;

pub use sheetdata_core::{cell, grid, notation, schema, value};

pub use error::SheetError;
pub use export::csharp::SourceUnit;

use log::{debug, info};

use sheetdata_core::{grid::Grid, schema::SheetSchema};
use sheetdata_parser::{ParseConfig, error::Diagnostic, parse_sheet};

use config::AppConfig;
use naming::Naming;
use resolve::TypeCatalog;
use source::SheetSource;

/// The outputs of one compiled sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSheet {
    /// Sheet name as given by the source.
    pub name: String,
    /// Name of the generated entity type.
    pub class_name: String,
    pub code: SourceUnit,
    /// The JSON data document, for sheets with a Design or Constant block.
    pub data: Option<String>,
    /// Non-fatal diagnostics raised while compiling.
    pub warnings: Vec<Diagnostic>,
}

/// Builder for parsing and compiling sheets.
///
/// Compilation takes two passes: every sheet of a run is parsed first, then
/// each sheet is compiled against all parsed schemas so that global enums
/// and records declared anywhere in the run resolve.
///
/// # Examples
///
/// ```
/// use sheetdata::{SheetCompiler, grid::Grid};
///
/// let grid = Grid::from_rows(vec![
///     vec!["[Design]"],
///     vec!["Name", "Type", "IsPrimaryKey"],
///     vec!["Id", "int", "true"],
///     vec!["[Name]"],
///     vec!["Id"],
///     vec!["[Data]"],
///     vec!["1"],
/// ]);
///
/// let compiler = SheetCompiler::default();
/// let schema = compiler.parse("Item", &grid).expect("Failed to parse");
/// let compiled = compiler
///     .compile(&schema, &grid, std::slice::from_ref(&schema))
///     .expect("Failed to compile");
///
/// assert_eq!(compiled.code.file_name, "Item.cs");
/// assert!(compiled.data.is_some());
/// ```
#[derive(Default)]
pub struct SheetCompiler {
    config: AppConfig,
}

impl SheetCompiler {
    /// Create a new compiler with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn parse_config(&self) -> Result<ParseConfig, SheetError> {
        Ok(self.config.sheet().parse_config()?)
    }

    fn naming(&self) -> Naming<'_> {
        Naming::new(self.config.sheet().input_notation(), self.config.naming())
    }

    /// Parse the schema section of one sheet.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Parse`] for structural and schema errors, or
    /// [`SheetError::Config`] if the sheet section of the configuration is
    /// invalid.
    pub fn parse(&self, name: &str, grid: &Grid) -> Result<SheetSchema, SheetError> {
        let config = self.parse_config()?;
        let schema = parse_sheet(name, grid.view(), &config)
            .map_err(|err| SheetError::new_parse_error(err, name))?;
        debug!(sheet = name, blocks = schema.blocks().len(); "Schema parsed");
        Ok(schema)
    }

    /// Compile one parsed sheet.
    ///
    /// `schemas` holds every schema of the run; global types of the other
    /// sheets in it are visible to this one. It may include `schema` itself.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Parse`] for type resolution and data errors, or
    /// [`SheetError::Json`] if the data cannot be serialized.
    pub fn compile(
        &self,
        schema: &SheetSchema,
        grid: &Grid,
        schemas: &[SheetSchema],
    ) -> Result<CompiledSheet, SheetError> {
        let name = schema.sheet();
        let config = self.parse_config()?;

        info!(sheet = name; "Resolving sheet types");
        let catalog = TypeCatalog::build(schema, schemas, self.naming())
            .map_err(|diag| SheetError::new_parse_error(diag, name))?;

        let data = resolve::resolve_data(schema, grid.view(), &catalog, &config)
            .map_err(|diag| SheetError::new_parse_error(diag, name))?;

        let (code, warnings) =
            export::csharp::sheet_unit(schema, &catalog, self.config.platforms());
        let data = export::json::to_document(&data, &catalog)?;

        info!(
            sheet = name,
            file = code.file_name.as_str(),
            has_data = data.is_some(),
            warnings = warnings.len();
            "Sheet compiled"
        );
        Ok(CompiledSheet {
            name: name.to_owned(),
            class_name: catalog.naming().record_name(name),
            code,
            data,
            warnings,
        })
    }

    /// Parse and compile every sheet of a source, stopping at the first
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns the first source, parse or compile error.
    pub fn compile_source(
        &self,
        source: &dyn SheetSource,
    ) -> Result<Vec<CompiledSheet>, SheetError> {
        let names = source.sheet_names();
        info!(sheets = names.len(); "Compiling sheet source");

        let mut grids = Vec::with_capacity(names.len());
        let mut schemas = Vec::with_capacity(names.len());
        for name in &names {
            let grid = source.grid(name)?;
            schemas.push(self.parse(name, &grid)?);
            grids.push(grid);
        }

        schemas
            .iter()
            .zip(&grids)
            .map(|(schema, grid)| self.compile(schema, grid, &schemas))
            .collect()
    }

    /// The shared helper units the generated sheet types derive from.
    pub fn support_units(&self) -> Vec<SourceUnit> {
        export::csharp::support::support_units(&self.naming(), self.config.platforms())
    }
}
