//! CLI logic for the Sheetdata compiler.
//!
//! A run compiles every sheet of one input directory. Sheets are parsed in
//! parallel, then compiled in parallel against all parsed schemas. A sheet
//! that fails is reported and skipped; the others are still written.

pub mod error_adapter;

mod args;
mod config;
mod source;

pub use args::Args;
pub use source::DirectorySource;

use std::{fs, path::Path};

use log::{debug, info, warn};
use rayon::prelude::*;

use sheetdata::{
    CompiledSheet, SheetCompiler, SheetError, SourceUnit, grid::Grid, schema::SheetSchema,
    source::SheetSource,
};
use sheetdata_parser::error::Diagnostic;

/// Directory under the output root receiving generated code.
pub const SCRIPTS_DIR: &str = "scripts";
/// Directory under the output root receiving data documents.
pub const DATA_DIR: &str = "data";

/// A non-fatal diagnostic of one compiled sheet.
#[derive(Debug, Clone)]
pub struct SheetWarning {
    pub sheet: String,
    pub diagnostic: Diagnostic,
}

/// Outcome of a run that got as far as compiling sheets.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Names of the sheets compiled successfully, in source order.
    pub compiled: Vec<String>,
    /// Warnings of the compiled sheets, in source order.
    pub warnings: Vec<SheetWarning>,
    /// One error per failed sheet.
    pub failures: Vec<SheetError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run the Sheetdata CLI application
///
/// This function compiles every sheet of the input directory and, unless
/// `--dry-run` is set, writes the generated code and data of each
/// successful sheet plus the shared support units.
///
/// # Errors
///
/// Returns `SheetError` for failures that stop the whole run:
/// - Configuration loading errors
/// - Listing the input directory
/// - Writing output files
///
/// Per-sheet failures are collected in the returned [`RunReport`].
pub fn run(args: &Args) -> Result<RunReport, SheetError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        dry_run = args.dry_run;
        "Compiling sheets"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let compiler = SheetCompiler::new(app_config);
    let source = DirectorySource::open(&args.input)?;

    let (compiled, failures) = compile_all(&compiler, &source);
    info!(
        compiled = compiled.len(),
        failed = failures.len();
        "Sheets compiled"
    );

    if args.dry_run {
        info!("Dry run, nothing written");
    } else {
        write_outputs(Path::new(&args.output), &compiler.support_units(), &compiled)?;
    }

    let warnings = compiled
        .iter()
        .flat_map(|sheet| {
            sheet.warnings.iter().map(|diagnostic| SheetWarning {
                sheet: sheet.name.clone(),
                diagnostic: diagnostic.clone(),
            })
        })
        .collect();

    Ok(RunReport {
        compiled: compiled.into_iter().map(|sheet| sheet.name).collect(),
        warnings,
        failures,
    })
}

/// Load, parse and compile every sheet of `source`.
///
/// Returns the compiled sheets in source order and one error per failed
/// sheet.
pub fn compile_all(
    compiler: &SheetCompiler,
    source: &dyn SheetSource,
) -> (Vec<CompiledSheet>, Vec<SheetError>) {
    let mut failures = Vec::new();

    let loaded: Vec<(String, Grid)> = source
        .sheet_names()
        .into_iter()
        .filter_map(|name| match source.grid(&name) {
            Ok(grid) => Some((name, grid)),
            Err(err) => {
                failures.push(err);
                None
            }
        })
        .collect();

    let parsed: Vec<Result<(SheetSchema, Grid), SheetError>> = loaded
        .into_par_iter()
        .map(|(name, grid)| compiler.parse(&name, &grid).map(|schema| (schema, grid)))
        .collect();

    let mut schemas = Vec::with_capacity(parsed.len());
    let mut grids = Vec::with_capacity(parsed.len());
    for result in parsed {
        match result {
            Ok((schema, grid)) => {
                schemas.push(schema);
                grids.push(grid);
            }
            Err(err) => failures.push(err),
        }
    }
    debug!(parsed = schemas.len(); "Schemas parsed");

    let results: Vec<Result<CompiledSheet, SheetError>> = schemas
        .par_iter()
        .zip(grids.par_iter())
        .map(|(schema, grid)| compiler.compile(schema, grid, &schemas))
        .collect();

    let mut compiled = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(sheet) => compiled.push(sheet),
            Err(err) => {
                warn!(sheet = err.sheet().unwrap_or_default(); "Sheet failed to compile");
                failures.push(err);
            }
        }
    }

    (compiled, failures)
}

/// Write support units, then each sheet's code and data.
fn write_outputs(
    root: &Path,
    support: &[SourceUnit],
    compiled: &[CompiledSheet],
) -> Result<(), SheetError> {
    let scripts = root.join(SCRIPTS_DIR);
    let data = root.join(DATA_DIR);
    fs::create_dir_all(&scripts)?;
    fs::create_dir_all(&data)?;

    for unit in support {
        fs::write(scripts.join(&unit.file_name), &unit.text)?;
    }
    debug!(units = support.len(); "Support units written");

    for sheet in compiled {
        fs::write(scripts.join(&sheet.code.file_name), &sheet.code.text)?;
        if let Some(document) = &sheet.data {
            fs::write(data.join(format!("{}.json", sheet.class_name)), document)?;
        }
        info!(sheet = sheet.name, has_data = sheet.data.is_some(); "Sheet written");
    }

    Ok(())
}
