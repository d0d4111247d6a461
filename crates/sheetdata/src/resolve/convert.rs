//! Cell text to typed values.
//!
//! Scalars and enums are read as literals. Lists and records are read as
//! JSON text and checked against the resolved type.

use indexmap::IndexMap;
use serde_json::Value as Json;

use sheetdata_core::{
    schema::{ConvertError, FieldType, ScalarType},
    value::Value,
};

use super::catalog::TypeCatalog;

/// Convert one cell into a value of `ty`.
///
/// # Errors
///
/// Returns [`ConvertError`] when the text is not a literal of the type, or
/// not JSON matching it for lists and records.
pub fn convert_text(
    catalog: &TypeCatalog<'_>,
    ty: &FieldType,
    text: &str,
) -> Result<Value, ConvertError> {
    match ty {
        FieldType::Scalar(scalar) => scalar.parse(text),
        FieldType::Enum(name) => catalog
            .enum_value(name, text)
            .ok_or_else(|| ConvertError::new(ty, text)),
        FieldType::Nullable(inner) => convert_text(catalog, inner, text),
        FieldType::Reference { key, .. } => convert_text(catalog, key, text),
        FieldType::List(_) | FieldType::Record(_) => {
            let json: Json =
                serde_json::from_str(text.trim()).map_err(|_| ConvertError::new(ty, text))?;
            convert_json(catalog, ty, &json)
        }
    }
}

/// Check a JSON value against `ty` and convert it.
pub fn convert_json(
    catalog: &TypeCatalog<'_>,
    ty: &FieldType,
    json: &Json,
) -> Result<Value, ConvertError> {
    let fail = || ConvertError::new(ty, json.to_string());

    if json.is_null() {
        return match ty.storage() {
            FieldType::Nullable(_)
            | FieldType::Record(_)
            | FieldType::Scalar(ScalarType::String) => Ok(Value::Null),
            FieldType::List(_) => Ok(Value::List(Vec::new())),
            _ => Err(fail()),
        };
    }

    match ty {
        FieldType::Nullable(inner) => convert_json(catalog, inner, json),
        FieldType::Reference { key, .. } => convert_json(catalog, key, json),
        FieldType::Scalar(scalar) => scalar_from_json(*scalar, json).ok_or_else(fail),
        FieldType::Enum(name) => {
            let text = match json {
                Json::String(s) => s.clone(),
                Json::Number(n) => n.to_string(),
                _ => return Err(fail()),
            };
            catalog.enum_value(name, &text).ok_or_else(fail)
        }
        FieldType::List(element) => {
            let Json::Array(items) = json else {
                return Err(fail());
            };
            items
                .iter()
                .map(|item| convert_json(catalog, element, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
        FieldType::Record(name) => {
            let (Json::Object(object), Some(shape)) = (json, catalog.record(name)) else {
                return Err(fail());
            };
            let mut fields: IndexMap<String, Value> = match catalog.zero(ty) {
                Value::Record(fields) => fields,
                _ => IndexMap::new(),
            };
            for (key, item) in object {
                let field = shape.field(key, catalog.naming()).ok_or_else(fail)?;
                fields.insert(field.emitted.clone(), convert_json(catalog, &field.ty, item)?);
            }
            Ok(Value::Record(fields))
        }
    }
}

fn scalar_from_json(scalar: ScalarType, json: &Json) -> Option<Value> {
    match (scalar, json) {
        (ScalarType::String, Json::String(s)) => Some(Value::Str(s.clone())),
        (ScalarType::String, _) => None,
        (ScalarType::Bool, Json::Bool(b)) => Some(Value::Bool(*b)),
        (_, Json::String(s)) => scalar.parse(s).ok(),
        (ScalarType::Bool | ScalarType::Char, _) => None,
        (_, Json::Number(n)) => scalar.parse(&n.to_string()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use sheetdata_core::{grid::Grid, notation::Notation};
    use sheetdata_parser::{ParseConfig, parse_sheet};

    use super::*;
    use crate::{config::NamingConfig, naming::Naming};

    fn with_catalog(f: impl FnOnce(&TypeCatalog<'_>)) {
        let grid = Grid::from_rows(vec![
            vec!["[Enum]", "Element"],
            vec!["Name", "Value"],
            vec!["Fire", "1"],
            vec!["Water", ""],
            vec!["[Record]", "Reward"],
            vec!["Name", "Type", "Optional"],
            vec!["ItemId", "int", ""],
            vec!["Count", "short", ""],
            vec!["Note", "string?", "true"],
        ]);
        let schema = parse_sheet("Shop", grid.view(), &ParseConfig::default()).unwrap();
        let config = NamingConfig::default();
        let catalog =
            TypeCatalog::build(&schema, [], Naming::new(Notation::Pascal, &config)).unwrap();
        f(&catalog);
    }

    fn record(name: &str) -> FieldType {
        FieldType::Record(name.into())
    }

    #[test]
    fn test_scalar_and_enum_text() {
        with_catalog(|catalog| {
            let int = FieldType::Scalar(ScalarType::Int);
            assert_eq!(convert_text(catalog, &int, " 7 "), Ok(Value::Int(7)));
            assert!(convert_text(catalog, &int, "seven").is_err());

            let element = FieldType::Enum("Element".into());
            assert_eq!(
                convert_text(catalog, &element, "2"),
                Ok(Value::Enum("Water".into()))
            );
            let err = convert_text(catalog, &element, "Wind").unwrap_err();
            assert_eq!(err.expected, "Element");
        });
    }

    #[test]
    fn test_record_json() {
        with_catalog(|catalog| {
            let value = convert_text(catalog, &record("Reward"), r#"{"ItemId": 3}"#).unwrap();
            assert_eq!(value.get("ItemId"), Some(&Value::Int(3)));
            assert_eq!(value.get("Count"), Some(&Value::Int(0)));
            assert_eq!(value.get("Note"), Some(&Value::Null));

            assert!(convert_text(catalog, &record("Reward"), r#"{"Price": 3}"#).is_err());
            assert!(convert_text(catalog, &record("Reward"), r#"{"Count": 70000}"#).is_err());
            assert!(convert_text(catalog, &record("Reward"), "not json").is_err());
        });
    }

    #[test]
    fn test_list_json() {
        with_catalog(|catalog| {
            let list = FieldType::List(Box::new(FieldType::Enum("Element".into())));
            assert_eq!(
                convert_text(catalog, &list, r#"["Fire", 2]"#),
                Ok(Value::List(vec![
                    Value::Enum("Fire".into()),
                    Value::Enum("Water".into()),
                ]))
            );
            assert_eq!(convert_text(catalog, &list, "null"), Ok(Value::List(vec![])));

            let numbers = FieldType::List(Box::new(FieldType::Scalar(ScalarType::Float)));
            assert_eq!(
                convert_text(catalog, &numbers, r#"[1, "2.5"]"#),
                Ok(Value::List(vec![Value::Float(1.0), Value::Float(2.5)]))
            );
            assert!(convert_text(catalog, &numbers, "[true]").is_err());
        });
    }
}
