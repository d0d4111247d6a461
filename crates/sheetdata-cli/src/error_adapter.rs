//! Error adapter for converting SheetError to miette diagnostics.
//!
//! This module provides the bridge between the library's error types and
//! miette's rich diagnostic formatting used in the CLI.
//!
//! Sheet diagnostics point at cells rather than text. The adapter renders
//! each labeled cell as one `Sheet!A1` line of a small synthetic source so
//! that miette can underline it and print the label next to it.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use sheetdata::SheetError;
use sheetdata_parser::error::{Diagnostic, Severity};

/// Adapter for a single sheet diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// One `Sheet!A1` line per label, in label order.
    src: String,
    spans: Vec<SourceSpan>,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter for a diagnostic of `sheet`.
    pub fn new(diag: &'a Diagnostic, sheet: &str) -> Self {
        let mut src = String::new();
        let mut spans = Vec::with_capacity(diag.labels().len());
        for label in diag.labels() {
            let reference = format!("{sheet}!{}", label.cell().to_a1());
            spans.push(SourceSpan::new(src.len().into(), reference.len()));
            src.push_str(&reference);
            src.push('\n');
        }
        Self { diag, src, spans }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.src.lines().next() {
            Some(location) => write!(f, "{location}: {}", self.diag.message()),
            None => write!(f, "{}", self.diag.message()),
        }
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        if self.src.is_empty() {
            return None;
        }
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().zip(&self.spans).map(|(label, span)| {
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, *span)
            } else {
                LabeledSpan::new_with_span(message, *span)
            }
        })))
    }
}

/// Adapter for non-diagnostic [`SheetError`] variants.
pub struct ErrorAdapter<'a>(pub &'a SheetError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            SheetError::Io(_) => "sheetdata::io",
            SheetError::Parse { .. } => return None,
            SheetError::Source(_) => "sheetdata::source",
            SheetError::UnknownSheet(_) => "sheetdata::unknown_sheet",
            SheetError::DuplicateSheetName { .. } => "sheetdata::duplicate_sheet",
            SheetError::Json(_) => "sheetdata::json",
            SheetError::Config(_) => "sheetdata::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            SheetError::DuplicateSheetName { .. } => Some(Box::new(
                "sheet names must be unique across every file of the input directory",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A diagnostic located at sheet cells.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without a location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`SheetError`] into a list of reportable errors.
///
/// For [`SheetError::Parse`], this returns one [`Reportable`] for each
/// diagnostic in the error. For other error variants, this returns a
/// single [`Reportable`].
pub fn to_reportables(err: &SheetError) -> Vec<Reportable<'_>> {
    match err {
        SheetError::Parse {
            err: parse_err,
            sheet,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, sheet)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use sheetdata::cell::CellRef;
    use sheetdata_parser::error::{ErrorCode, ParseError};

    use super::*;

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("duplicate key `1`")
            .with_code(ErrorCode::E304)
            .with_label(CellRef::new(4, 0), "duplicate key")
            .with_help("every data row needs a distinct primary key");
        let err = SheetError::new_parse_error(ParseError::from(diag), "Item");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "Item!A5: duplicate key `1`");
                assert_eq!(d.code().map(|c| c.to_string()).as_deref(), Some("E304"));
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_labels_point_into_synthetic_source() {
        let diag = Diagnostic::error("duplicate key `1`")
            .with_label(CellRef::new(4, 0), "duplicate key")
            .with_secondary_label(CellRef::new(3, 0), "first used here");

        let adapter = DiagnosticAdapter::new(&diag, "Item");
        assert_eq!(adapter.src, "Item!A5\nItem!A4\n");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label(), Some("duplicate key"));
        assert!(labels[0].primary());
        assert_eq!(labels[1].label(), Some("first used here"));
        assert!(!labels[1].primary());
        assert_eq!(labels[1].offset(), 8);
        assert_eq!(labels[1].len(), 7);
    }

    #[test]
    fn test_warning_severity() {
        let warning = Diagnostic::warning("`Hidden` is scoped to the sheet entity")
            .with_label(CellRef::new(0, 0), "scoped declaration");
        let error = Diagnostic::error("duplicate key `1`");

        assert_eq!(
            DiagnosticAdapter::new(&warning, "Item").severity(),
            Some(miette::Severity::Warning)
        );
        assert_eq!(
            DiagnosticAdapter::new(&error, "Item").severity(),
            Some(miette::Severity::Error)
        );
    }

    #[test]
    fn test_diagnostic_without_labels() {
        let diag = Diagnostic::error("no cells");
        let adapter = DiagnosticAdapter::new(&diag, "Item");

        assert_eq!(adapter.to_string(), "no cells");
        assert!(adapter.source_code().is_none());
        assert!(adapter.labels().is_none());
    }

    #[test]
    fn test_non_parse_error() {
        let err = SheetError::DuplicateSheetName {
            name: "Item".to_string(),
            first: "a.csv".to_string(),
            second: "b.xlsx".to_string(),
        };

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(
                    e.to_string(),
                    "Sheet `Item` is defined in both `a.csv` and `b.xlsx`"
                );
                assert_eq!(
                    e.code().map(|c| c.to_string()).as_deref(),
                    Some("sheetdata::duplicate_sheet")
                );
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }
}
