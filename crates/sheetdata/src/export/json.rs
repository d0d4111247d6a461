//! JSON data documents.
//!
//! Values are serialized through their resolved types, so optional fields
//! that are null are omitted and lists are always arrays.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use sheetdata_core::{schema::FieldType, value::Value};

use crate::resolve::{RecordShape, SheetData, TypeCatalog};

/// Serialize the data of one sheet.
///
/// Returns `None` for a sheet with neither data rows nor constants. Rows
/// alone become an array, constants alone an object, and both together an
/// `{"item1": constants, "item2": rows}` envelope.
///
/// # Errors
///
/// Returns the serializer error.
pub fn to_document(
    data: &SheetData,
    catalog: &TypeCatalog<'_>,
) -> Result<Option<String>, serde_json::Error> {
    let rows = match (&data.rows, catalog.entity()) {
        (Some(rows), Some(shape)) => Some(Rows {
            rows,
            shape,
            catalog,
        }),
        _ => None,
    };
    let constants = data.constants.as_ref().map(|value| Record {
        value,
        shape: catalog.constants(),
        catalog,
    });

    let text = match (constants, rows) {
        (Some(constants), Some(rows)) => serde_json::to_string_pretty(&Envelope {
            item1: constants,
            item2: rows,
        })?,
        (Some(constants), None) => serde_json::to_string_pretty(&constants)?,
        (None, Some(rows)) => serde_json::to_string_pretty(&rows)?,
        (None, None) => return Ok(None),
    };
    Ok(Some(text))
}

#[derive(serde::Serialize)]
struct Envelope<'a> {
    item1: Record<'a>,
    item2: Rows<'a>,
}

struct Rows<'a> {
    rows: &'a [Value],
    shape: &'a RecordShape,
    catalog: &'a TypeCatalog<'a>,
}

impl Serialize for Rows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for value in self.rows {
            seq.serialize_element(&Record {
                value,
                shape: self.shape,
                catalog: self.catalog,
            })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    value: &'a Value,
    shape: &'a RecordShape,
    catalog: &'a TypeCatalog<'a>,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(fields) = self.value.as_record() else {
            return serializer.serialize_none();
        };

        let mut map = serializer.serialize_map(None)?;
        for field in self.shape.fields() {
            let value = fields.get(&field.emitted).unwrap_or(&Value::Null);
            if field.optional && value.is_null() {
                continue;
            }
            map.serialize_entry(
                &field.emitted,
                &Typed {
                    value,
                    ty: &field.ty,
                    catalog: self.catalog,
                },
            )?;
        }
        map.end()
    }
}

struct Typed<'a> {
    value: &'a Value,
    ty: &'a FieldType,
    catalog: &'a TypeCatalog<'a>,
}

impl Serialize for Typed<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (self.ty, self.value) {
            (FieldType::Nullable(inner), value) => Typed {
                value,
                ty: inner,
                catalog: self.catalog,
            }
            .serialize(serializer),
            (FieldType::Reference { key, .. }, value) => Typed {
                value,
                ty: key,
                catalog: self.catalog,
            }
            .serialize(serializer),
            (FieldType::List(_), Value::Null) => serializer.serialize_seq(Some(0))?.end(),
            (FieldType::List(element), Value::List(items)) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&Typed {
                        value: item,
                        ty: element,
                        catalog: self.catalog,
                    })?;
                }
                seq.end()
            }
            (FieldType::Record(name), value @ Value::Record(_)) => match self.catalog.record(name)
            {
                Some(shape) => Record {
                    value,
                    shape,
                    catalog: self.catalog,
                }
                .serialize(serializer),
                None => Plain(value).serialize(serializer),
            },
            (_, value) => Plain(value).serialize(serializer),
        }
    }
}

/// A value serialized by its own shape.
struct Plain<'a>(&'a Value);

impl Serialize for Plain<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) | Value::Enum(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items.iter().map(Plain)),
            Value::Record(fields) => {
                serializer.collect_map(fields.iter().map(|(name, value)| (name, Plain(value))))
            }
        }
    }
}
