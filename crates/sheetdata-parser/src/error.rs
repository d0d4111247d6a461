//! Error and diagnostic system for the sheetdata parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Labeled cell references for rich error context
//! - Severity levels
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, one or more
//! sheet cells, and help text. Diagnostics are wrapped in [`ParseError`] for
//! returning from the compile lifecycle.
//!
//! # Example
//!
//! ```
//! # use sheetdata_parser::error::{Diagnostic, ErrorCode};
//! # use sheetdata_core::cell::CellRef;
//!
//! let diag = Diagnostic::error("`Design` block appears more than once")
//!     .with_code(ErrorCode::E101)
//!     .with_label(CellRef::new(12, 0), "duplicate block")
//!     .with_secondary_label(CellRef::new(3, 0), "first declared here")
//!     .with_help("merge the elements into a single block");
//! ```

mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::{ParseError, Result};
pub use severity::Severity;
