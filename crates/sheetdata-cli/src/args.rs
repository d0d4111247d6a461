//! Command-line argument definitions for the Sheetdata CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the sheet directory, the output
//! directory, configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Sheetdata compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding the sheet files (`.csv`, `.xlsx`)
    #[arg(help = "Directory holding the sheet files")]
    pub input: String,

    /// Output directory; code goes to `scripts/`, data to `data/`
    #[arg(short, long, default_value = "output")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Compile every sheet without writing any output
    #[arg(long)]
    pub dry_run: bool,
}
