//! Constant block evaluation.

use indexmap::IndexMap;
use log::debug;

use sheetdata_core::{schema::ConstantField, value::Value};
use sheetdata_parser::error::{Diagnostic, ErrorCode};

use super::{catalog::TypeCatalog, convert::convert_text};

/// Convert every constant's `Value` cell into one record keyed by the
/// constants' public names.
///
/// # Errors
///
/// Returns `E302` at the `Value` cell of the first constant that does not
/// convert to its type.
pub fn evaluate(
    fields: &[ConstantField],
    catalog: &TypeCatalog<'_>,
) -> Result<Value, Diagnostic> {
    let mut values = IndexMap::with_capacity(fields.len());

    for (field, resolved) in fields.iter().zip(catalog.constants().fields()) {
        let value = convert_text(catalog, &resolved.ty, &field.value).map_err(|err| {
            Diagnostic::error(format!("constant `{}`: {err}", field.name))
                .with_code(ErrorCode::E302)
                .with_label(field.value_cell, format!("expected `{}`", err.expected))
                .with_secondary_label(field.type_cell, "type declared here")
        })?;
        values.insert(resolved.emitted.clone(), value);
    }

    debug!(constants = values.len(); "Constants evaluated");
    Ok(Value::Record(values))
}

#[cfg(test)]
mod tests {
    use sheetdata_core::{grid::Grid, notation::Notation};
    use sheetdata_parser::{ParseConfig, parse_sheet};

    use super::*;
    use crate::{config::NamingConfig, naming::Naming};

    fn evaluate_rows(rows: Vec<Vec<&str>>) -> Result<Value, Diagnostic> {
        let grid = Grid::from_rows(rows);
        let schema = parse_sheet("Balance", grid.view(), &ParseConfig::default()).unwrap();
        let config = NamingConfig::default();
        let catalog =
            TypeCatalog::build(&schema, [], Naming::new(Notation::Pascal, &config)).unwrap();
        let (_, fields) = schema.constant().unwrap();
        evaluate(fields, &catalog)
    }

    #[test]
    fn test_scalar_list_and_record_constants() {
        let value = evaluate_rows(vec![
            vec!["[Record]", "Point"],
            vec!["Name", "Type"],
            vec!["X", "int"],
            vec!["Y", "int"],
            vec!["[Constant]"],
            vec!["Name", "Type", "Value"],
            vec!["MaxLevel", "byte", "50"],
            vec!["Origin", "Point", r#"{"X": 1, "Y": -2}"#],
            vec!["Steps", "List<double>", "[0.5, 1]"],
        ])
        .unwrap();

        assert_eq!(value.get("MaxLevel"), Some(&Value::Int(50)));
        assert_eq!(value.get("Origin").unwrap().get("Y"), Some(&Value::Int(-2)));
        assert_eq!(
            value.get("Steps"),
            Some(&Value::List(vec![Value::Float(0.5), Value::Float(1.0)]))
        );
    }

    #[test]
    fn test_invalid_constant_value() {
        let err = evaluate_rows(vec![
            vec!["[Constant]"],
            vec!["Name", "Type", "Value"],
            vec!["MaxLevel", "byte", "300"],
        ])
        .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E302));
        assert_eq!(err.primary_cell().unwrap().to_a1(), "C3");
    }
}
