//! Identifier conversion from sheet names to generated names.

use sheetdata_core::notation::Notation;

use crate::config::NamingConfig;

/// Converts declared names (in the sheet's input notation) and fixed
/// Pascal-cased names into generated identifiers.
#[derive(Debug, Clone, Copy)]
pub struct Naming<'a> {
    input: Notation,
    config: &'a NamingConfig,
}

impl<'a> Naming<'a> {
    pub fn new(input: Notation, config: &'a NamingConfig) -> Self {
        Self { input, config }
    }

    pub fn config(&self) -> &'a NamingConfig {
        self.config
    }

    fn from_input(&self, name: &str, to: Notation) -> String {
        self.input.convert(name, to)
    }

    pub fn record_name(&self, name: &str) -> String {
        self.from_input(name, self.config.record_name())
    }

    pub fn record_property(&self, name: &str) -> String {
        self.from_input(name, self.config.record_property_name())
    }

    pub fn enum_name(&self, name: &str) -> String {
        self.from_input(name, self.config.enum_name())
    }

    pub fn enum_item(&self, name: &str) -> String {
        self.from_input(name, self.config.enum_item_name())
    }

    pub fn public_variable(&self, name: &str) -> String {
        self.from_input(name, self.config.public_variable_name())
    }

    pub fn private_variable(&self, name: &str) -> String {
        format!(
            "{}{}",
            self.config.private_variable_prefix(),
            self.from_input(name, self.config.private_variable_name())
        )
    }

    pub fn interface_name(&self, name: &str) -> String {
        format!(
            "{}{}",
            self.config.interface_prefix(),
            self.from_input(name, self.config.interface_name())
        )
    }

    /// A fixed helper type name, given in Pascal case.
    pub fn class(&self, pascal: &str) -> String {
        Notation::Pascal.convert(pascal, self.config.class_name())
    }

    /// A fixed helper interface name, given in Pascal case.
    pub fn interface(&self, pascal: &str) -> String {
        format!(
            "{}{}",
            self.config.interface_prefix(),
            Notation::Pascal.convert(pascal, self.config.interface_name())
        )
    }

    /// A fixed function name, given in Pascal case.
    pub fn function(&self, pascal: &str) -> String {
        Notation::Pascal.convert(pascal, self.config.function_name())
    }

    /// A fixed public member name, given in Pascal case.
    pub fn member(&self, pascal: &str) -> String {
        Notation::Pascal.convert(pascal, self.config.public_variable_name())
    }

    /// A fixed private member name, given in camel case.
    pub fn private_member(&self, camel: &str) -> String {
        format!(
            "{}{}",
            self.config.private_variable_prefix(),
            Notation::Camel.convert(camel, self.config.private_variable_name())
        )
    }

    /// The name of the accessor resolving a reference field.
    ///
    /// The last occurrence of the reference symbol is replaced by the
    /// reference word; without one the word is appended.
    pub fn reference_accessor(&self, field_name: &str) -> String {
        let symbol = self.config.reference_symbol();
        let word = self.config.reference_word();
        match field_name.rfind(symbol).filter(|_| !symbol.is_empty()) {
            Some(at) => format!(
                "{}{}{}",
                &field_name[..at],
                word,
                &field_name[at + symbol.len()..]
            ),
            None => format!("{field_name}{word}"),
        }
    }
}
