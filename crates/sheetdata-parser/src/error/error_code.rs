//! Error codes for the sheetdata diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E1xx` - Sheet structure errors
//! - `E2xx` - Schema errors
//! - `E3xx` - Data errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Sheet Structure Errors (E1xx)
    // =========================================================================
    /// Unknown block type.
    ///
    /// A bracketed header cell names a block kind that does not exist.
    E100,

    /// Duplicate block.
    ///
    /// A `Description`, `Design` or `Constant` block appears twice in one sheet.
    E101,

    /// Missing element header.
    ///
    /// A block's element header row lacks a column the block requires.
    E102,

    /// Unknown element header.
    ///
    /// An element header cell does not name any column of the block.
    E103,

    /// Missing element.
    ///
    /// An essential element cell is blank.
    E104,

    /// Missing block name.
    ///
    /// An `Enum`, `Record` or `Interface` header row has no name cell.
    E105,

    /// Invalid element value.
    ///
    /// An element cell holds a value its column does not accept, such as a
    /// non-boolean `IsPrimaryKey`.
    E106,

    /// Missing description text.
    ///
    /// A `Description` block has no text in the cell below its header.
    E107,

    /// Invalid type expression.
    ///
    /// A `Type` cell is not a valid type.
    E108,

    // =========================================================================
    // Schema Errors (E2xx)
    // =========================================================================
    /// Undefined type.
    ///
    /// A type name does not match any enum or record visible to the sheet.
    E200,

    /// Missing primary key.
    ///
    /// A `Design` block marks none of its fields as the primary key.
    E201,

    /// Duplicate element name.
    ///
    /// Two elements of one block share a name.
    E202,

    /// Invalid enum value.
    ///
    /// An enum member value is not an integer in the backing type's range.
    E203,

    // =========================================================================
    // Data Errors (E3xx)
    // =========================================================================
    /// Missing Name or Data marker.
    ///
    /// A sheet with a `Design` block lacks the `[Name]` row or, when data
    /// markers are enabled, the `[Data]` row.
    E300,

    /// Invalid access path.
    ///
    /// A `[Name]` row cell does not resolve against the entity's fields.
    E301,

    /// Type mismatch.
    ///
    /// A data cell does not convert to the type its column resolves to.
    E302,

    /// Missing required value.
    ///
    /// A data cell is blank for a column that is neither a list nor nullable.
    E303,

    /// Duplicate key.
    ///
    /// Two data rows produce the same primary key.
    E304,

    /// Ambiguous data section.
    ///
    /// The rows after `[Name]` do not match the configured data marker
    /// mode, so the start of the data rows is ambiguous.
    E305,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E104").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Sheet structure errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            ErrorCode::E107 => "E107",
            ErrorCode::E108 => "E108",
            // Schema errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            // Data errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            ErrorCode::E305 => "E305",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Sheet structure errors
            ErrorCode::E100 => "unknown block type",
            ErrorCode::E101 => "duplicate block",
            ErrorCode::E102 => "missing element header",
            ErrorCode::E103 => "unknown element header",
            ErrorCode::E104 => "missing element",
            ErrorCode::E105 => "missing block name",
            ErrorCode::E106 => "invalid element value",
            ErrorCode::E107 => "missing description text",
            ErrorCode::E108 => "invalid type expression",
            // Schema errors
            ErrorCode::E200 => "undefined type",
            ErrorCode::E201 => "missing primary key",
            ErrorCode::E202 => "duplicate element name",
            ErrorCode::E203 => "invalid enum value",
            // Data errors
            ErrorCode::E300 => "missing name or data marker",
            ErrorCode::E301 => "invalid access path",
            ErrorCode::E302 => "type mismatch",
            ErrorCode::E303 => "missing required value",
            ErrorCode::E304 => "duplicate key",
            ErrorCode::E305 => "ambiguous data section",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::E100.as_str(), "E100");
        assert_eq!(ErrorCode::E203.as_str(), "E203");
        assert_eq!(ErrorCode::E305.as_str(), "E305");
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::E304), "E304");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E101.description(), "duplicate block");
        assert_eq!(ErrorCode::E302.description(), "type mismatch");
    }
}
