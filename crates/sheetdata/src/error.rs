//! Error types for sheet compilation.
//!
//! This module provides the main error type [`SheetError`], which wraps the
//! failures of every pipeline stage.

use std::io;

use thiserror::Error;

use sheetdata_parser::error::ParseError;

use crate::config::ConfigError;

/// The main error type for sheet compilation.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries cell-located diagnostics for one sheet. Every
/// structural, schema and data error of a sheet is reported through it.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, sheet: String },

    #[error("Sheet source error: {0}")]
    Source(String),

    #[error("Unknown sheet `{0}`")]
    UnknownSheet(String),

    #[error("Sheet `{name}` is defined in both `{first}` and `{second}`")]
    DuplicateSheetName {
        name: String,
        first: String,
        second: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An invalid configuration, from the library or from loading it.
    #[error("Configuration error: {0}")]
    Config(Box<dyn std::error::Error + Send + Sync>),
}

impl From<ConfigError> for SheetError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Box::new(err))
    }
}

impl SheetError {
    /// Create a new `Parse` error for the named sheet.
    pub fn new_parse_error(err: impl Into<ParseError>, sheet: impl Into<String>) -> Self {
        Self::Parse {
            err: err.into(),
            sheet: sheet.into(),
        }
    }

    /// The sheet this error belongs to, for sheet-level errors.
    pub fn sheet(&self) -> Option<&str> {
        match self {
            Self::Parse { sheet, .. } => Some(sheet),
            Self::UnknownSheet(name) | Self::DuplicateSheetName { name, .. } => Some(name),
            _ => None,
        }
    }
}
