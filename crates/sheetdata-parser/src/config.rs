//! Settings that change how sheet text is read.

use sheetdata_core::{notation::Notation, schema::ScalarType};

/// Parser settings.
///
/// ```
/// use sheetdata_core::notation::Notation;
/// use sheetdata_parser::ParseConfig;
///
/// let config = ParseConfig::default()
///     .with_input_notation(Notation::LowerSnake)
///     .with_ignore_marker("#");
/// assert!(config.is_ignored(Some("# note")));
/// assert!(config.is_ignored(None));
/// assert!(!config.is_ignored(Some("sword")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    input_notation: Notation,
    ignore_marker: String,
    use_data_marker: bool,
    enum_default_type: ScalarType,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            input_notation: Notation::Pascal,
            ignore_marker: ";".to_owned(),
            use_data_marker: true,
            enum_default_type: ScalarType::Int,
        }
    }
}

impl ParseConfig {
    pub fn with_input_notation(mut self, notation: Notation) -> Self {
        self.input_notation = notation;
        self
    }

    pub fn with_ignore_marker(mut self, marker: impl Into<String>) -> Self {
        self.ignore_marker = marker.into();
        self
    }

    /// Whether data rows start after a `[Data]` marker instead of directly
    /// after the `[Name]` path row.
    pub fn with_data_marker(mut self, enabled: bool) -> Self {
        self.use_data_marker = enabled;
        self
    }

    /// Backing type of enums that do not name one. Must be an integer type.
    pub fn with_enum_default_type(mut self, ty: ScalarType) -> Self {
        if ty.is_integer() {
            self.enum_default_type = ty;
        }
        self
    }

    pub fn input_notation(&self) -> Notation {
        self.input_notation
    }

    pub fn ignore_marker(&self) -> &str {
        &self.ignore_marker
    }

    pub fn use_data_marker(&self) -> bool {
        self.use_data_marker
    }

    pub fn enum_default_type(&self) -> ScalarType {
        self.enum_default_type
    }

    /// Convert a canonical Pascal name into the input notation.
    pub fn input_name(&self, pascal: &str) -> String {
        Notation::Pascal.convert(pascal, self.input_notation)
    }

    /// Convert an input-notation name into canonical Pascal form.
    pub fn canonical_name(&self, input: &str) -> String {
        self.input_notation.convert(input, Notation::Pascal)
    }

    /// Returns `true` for a blank first cell or one starting with the
    /// ignore marker.
    pub fn is_ignored(&self, cell: Option<&str>) -> bool {
        match cell {
            None => true,
            Some(text) => {
                !self.ignore_marker.is_empty() && text.trim_start().starts_with(&self.ignore_marker)
            }
        }
    }
}
