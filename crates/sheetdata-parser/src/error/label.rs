//! Labeled cell references for diagnostic messages.

use sheetdata_core::cell::CellRef;

/// A message attached to one sheet cell.
///
/// - **Primary labels** mark the cell that caused the error.
/// - **Secondary labels** point at related cells, such as the first
///   declaration of a duplicated block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    cell: CellRef,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(cell: CellRef, message: impl Into<String>) -> Self {
        Self {
            cell,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(cell: CellRef, message: impl Into<String>) -> Self {
        Self {
            cell,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the cell this label applies to.
    pub fn cell(&self) -> CellRef {
        self.cell
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label() {
        let label = Label::primary(CellRef::new(11, 2), "error here");

        assert_eq!(label.cell().to_a1(), "C12");
        assert_eq!(label.message(), "error here");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
    }

    #[test]
    fn test_secondary_label() {
        let label = Label::secondary(CellRef::new(0, 0), "first declared here");

        assert_eq!(label.cell().to_a1(), "A1");
        assert!(label.is_secondary());
    }
}
