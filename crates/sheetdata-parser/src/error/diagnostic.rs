//! The core diagnostic type for the sheetdata error system.

use std::fmt;

use sheetdata_core::cell::CellRef;

use crate::error::{Severity, error_code::ErrorCode, label::Label};

/// A diagnostic message pointing at one or more sheet cells.
///
/// Diagnostics carry:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - Labeled cells (primary and secondary)
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// error[E304]: duplicate key `1`
///   --> Item!A5
///    = note: first used at Item!A4
///    = help: every data row needs a distinct primary key
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use sheetdata_parser::error::{Diagnostic, ErrorCode};
    /// # use sheetdata_core::cell::CellRef;
    ///
    /// let diag = Diagnostic::error("undefined type `Grade`")
    ///     .with_code(ErrorCode::E200)
    ///     .with_label(CellRef::new(4, 1), "not declared in any sheet")
    ///     .with_help("declare it in an `[Enum]` or `[Record]` block");
    /// assert_eq!(diag.primary_cell().map(|c| c.to_a1()), Some("B5".to_owned()));
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the cell of the first primary label.
    pub fn primary_cell(&self) -> Option<CellRef> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::cell)
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, cell: CellRef, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(cell, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, cell: CellRef, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(cell, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E104]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
