//! Sheetdata CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};

use sheetdata::SheetError;
use sheetdata_cli::{
    Args, SheetWarning,
    error_adapter::{DiagnosticAdapter, to_reportables},
};

fn render(diagnostic: &dyn miette::Diagnostic) -> String {
    let mut writer = String::new();
    miette::GraphicalReportHandler::new()
        .render_report(&mut writer, diagnostic)
        .expect("Writing to String buffer is infallible");
    writer
}

fn render_error(err: &SheetError) {
    // Render each diagnostic independently
    for reportable in to_reportables(err) {
        error!("{}", render(&reportable));
    }
}

fn render_warnings(warnings: &[SheetWarning]) {
    for warning in warnings {
        let adapter = DiagnosticAdapter::new(&warning.diagnostic, &warning.sheet);
        warn!("{}", render(&adapter));
    }
}

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Sheetdata");
    debug!(args:?; "Parsed arguments");

    match sheetdata_cli::run(&args) {
        Ok(outcome) if outcome.is_success() => {
            render_warnings(&outcome.warnings);
            info!(sheets = outcome.compiled.len(); "Completed successfully");
        }
        Ok(outcome) => {
            render_warnings(&outcome.warnings);
            for err in &outcome.failures {
                render_error(err);
            }
            error!(
                failed = outcome.failures.len(),
                compiled = outcome.compiled.len();
                "Some sheets failed to compile"
            );
            process::exit(1);
        }
        Err(err) => {
            render_error(&err);
            process::exit(1);
        }
    }
}
