//! Configuration types for sheet compilation.
//!
//! All types implement [`serde::Deserialize`] and every field has a default,
//! so an empty TOML document is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`SheetConfig`] - How sheet text is read (input notation, markers).
//! - [`NamingConfig`] - Identifier notations and literals of the generated code.
//! - [`PlatformConfig`] - One target platform of the generated code.
//!
//! # Example
//!
//! ```
//! # use sheetdata::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.naming().namespace(), Some("Sheet"));
//! assert!(config.sheet().parse_config().is_ok());
//! ```

use serde::Deserialize;
use thiserror::Error;

use sheetdata_core::{notation::Notation, schema::ScalarType};
use sheetdata_parser::ParseConfig;

/// An invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid enum default type in config: `{0}` is not an integer type")]
    EnumDefaultType(ScalarType),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Sheet reading section.
    #[serde(default)]
    sheet: SheetConfig,

    /// Generated identifier section.
    #[serde(default)]
    naming: NamingConfig,

    /// Target platforms, in `#if`/`#elif` order.
    #[serde(default)]
    platforms: Vec<PlatformConfig>,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(sheet: SheetConfig, naming: NamingConfig, platforms: Vec<PlatformConfig>) -> Self {
        Self {
            sheet,
            naming,
            platforms,
        }
    }

    /// Returns the sheet reading configuration.
    pub fn sheet(&self) -> &SheetConfig {
        &self.sheet
    }

    /// Returns the naming configuration.
    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Returns the configured target platforms.
    pub fn platforms(&self) -> &[PlatformConfig] {
        &self.platforms
    }
}

/// How sheet text is read.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Notation of block tags, element headers and names in the sheet.
    input_notation: Notation,

    /// Prefix of rows and columns that are skipped.
    ignore_marker: String,

    /// Whether data rows follow a `[Data]` marker row.
    use_data_marker: bool,

    /// Backing type of enums that do not name one.
    enum_default_type: ScalarType,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            input_notation: Notation::Pascal,
            ignore_marker: ";".to_owned(),
            use_data_marker: true,
            enum_default_type: ScalarType::Int,
        }
    }
}

impl SheetConfig {
    pub fn input_notation(&self) -> Notation {
        self.input_notation
    }

    pub fn ignore_marker(&self) -> &str {
        &self.ignore_marker
    }

    pub fn use_data_marker(&self) -> bool {
        self.use_data_marker
    }

    /// Returns the enum backing type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnumDefaultType`] if the configured type is not
    /// an integer type.
    pub fn enum_default_type(&self) -> Result<ScalarType, ConfigError> {
        if self.enum_default_type.is_integer() {
            Ok(self.enum_default_type)
        } else {
            Err(ConfigError::EnumDefaultType(self.enum_default_type))
        }
    }

    /// Builds the parser settings for this section.
    ///
    /// # Errors
    ///
    /// Returns an error if the enum default type is invalid.
    pub fn parse_config(&self) -> Result<ParseConfig, ConfigError> {
        Ok(ParseConfig::default()
            .with_input_notation(self.input_notation)
            .with_ignore_marker(self.ignore_marker.clone())
            .with_data_marker(self.use_data_marker)
            .with_enum_default_type(self.enum_default_type()?))
    }
}

/// Notations and literals used for generated identifiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    record_name: Notation,
    record_property_name: Notation,
    enum_name: Notation,
    enum_item_name: Notation,
    class_name: Notation,
    public_variable_name: Notation,
    private_variable_name: Notation,
    interface_name: Notation,
    function_name: Notation,
    private_variable_prefix: String,
    interface_prefix: String,
    /// Empty means no namespace scope.
    namespace: String,
    reference_symbol: String,
    reference_word: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            record_name: Notation::Pascal,
            record_property_name: Notation::Pascal,
            enum_name: Notation::Pascal,
            enum_item_name: Notation::Pascal,
            class_name: Notation::Pascal,
            public_variable_name: Notation::Pascal,
            private_variable_name: Notation::Camel,
            interface_name: Notation::Pascal,
            function_name: Notation::Pascal,
            private_variable_prefix: "_".to_owned(),
            interface_prefix: "I".to_owned(),
            namespace: "Sheet".to_owned(),
            reference_symbol: "Id".to_owned(),
            reference_word: "Reference".to_owned(),
        }
    }
}

impl NamingConfig {
    pub fn record_name(&self) -> Notation {
        self.record_name
    }

    pub fn record_property_name(&self) -> Notation {
        self.record_property_name
    }

    pub fn enum_name(&self) -> Notation {
        self.enum_name
    }

    pub fn enum_item_name(&self) -> Notation {
        self.enum_item_name
    }

    pub fn class_name(&self) -> Notation {
        self.class_name
    }

    pub fn public_variable_name(&self) -> Notation {
        self.public_variable_name
    }

    pub fn private_variable_name(&self) -> Notation {
        self.private_variable_name
    }

    pub fn interface_name(&self) -> Notation {
        self.interface_name
    }

    pub fn function_name(&self) -> Notation {
        self.function_name
    }

    pub fn private_variable_prefix(&self) -> &str {
        &self.private_variable_prefix
    }

    pub fn interface_prefix(&self) -> &str {
        &self.interface_prefix
    }

    /// Returns the namespace, or `None` when generated code is not scoped.
    pub fn namespace(&self) -> Option<&str> {
        let namespace = self.namespace.trim();
        (!namespace.is_empty()).then_some(namespace)
    }

    pub fn reference_symbol(&self) -> &str {
        &self.reference_symbol
    }

    pub fn reference_word(&self) -> &str {
        &self.reference_word
    }
}

/// Kind of runtime the generated code loads its data on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    /// Loads data as addressable text assets.
    #[default]
    Unity,
    /// Loads data from JSON files on disk.
    Dotnet,
}

/// One target platform of the generated code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    kind: PlatformKind,
    /// Preprocessor symbol guarding this platform's code.
    define_name: String,
    /// Extra `using` namespaces for this platform.
    namespaces: Vec<String>,
    /// Directory the generated code loads data from at runtime.
    default_directory: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            kind: PlatformKind::Unity,
            define_name: "UNITY_2022_1_OR_NEWER".to_owned(),
            namespaces: Vec::new(),
            default_directory: "SheetData".to_owned(),
        }
    }
}

impl PlatformConfig {
    /// Creates a platform with the given kind and preprocessor symbol.
    pub fn new(kind: PlatformKind, define_name: impl Into<String>) -> Self {
        Self {
            kind,
            define_name: define_name.into(),
            namespaces: Vec::new(),
            default_directory: "SheetData".to_owned(),
        }
    }

    /// Sets the extra `using` namespaces.
    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Sets the runtime data directory.
    pub fn with_default_directory(mut self, directory: impl Into<String>) -> Self {
        self.default_directory = directory.into();
        self
    }

    pub fn kind(&self) -> PlatformKind {
        self.kind
    }

    pub fn define_name(&self) -> &str {
        &self.define_name
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn default_directory(&self) -> &str {
        &self.default_directory
    }
}
