//! Materialized data values.
//!
//! A [`Value`] tree is what a data row or a constant becomes after its cell
//! text has been converted against the schema. Record fields keep insertion
//! order, which is the declaration order of the record's type.

use std::{
    fmt,
    hash::{Hash, Hasher},
    mem,
};

use indexmap::IndexMap;

/// A typed data value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Str(String),
    /// An enum member, by its emitted name.
    Enum(String),
    List(Vec<Value>),
    /// Fields keyed by their emitted property name.
    Record(IndexMap<String, Value>),
}

impl Value {
    /// Build the narrowest integer variant holding `n`.
    ///
    /// Values outside the `u64`/`i64` union saturate; callers range-check
    /// against the declared type first.
    pub fn from_integer(n: i128) -> Self {
        if let Ok(i) = i64::try_from(n) {
            Value::Int(i)
        } else if let Ok(u) = u64::try_from(n) {
            Value::UInt(u)
        } else if n < 0 {
            Value::Int(i64::MIN)
        } else {
            Value::UInt(u64::MAX)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a record field by emitted name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_record().and_then(|fields| fields.get(field))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) | Value::Enum(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A primary key read back from a materialized row.
///
/// Composite keys render as a tuple, matching the generated key accessor.
/// Keys compare by value; `0.0` equals `-0.0` and every NaN equals every
/// other NaN.
#[derive(Debug, Clone)]
pub struct Key(pub Vec<Value>);

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| same(a, b))
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for value in &self.0 {
            hash_value(value, state);
        }
    }
}

fn float_bits(f: f64) -> u64 {
    if f == 0.0 {
        0
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => float_bits(*x) == float_bits(*y),
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| same(a, b))
        }
        (Value::Record(x), Value::Record(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y)
                    .all(|((ka, va), (kb, vb))| ka == kb && same(va, vb))
        }
        _ => a == b,
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    mem::discriminant(value).hash(state);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(state),
        Value::Int(i) => i.hash(state),
        Value::UInt(u) => u.hash(state),
        Value::Float(f) => float_bits(*f).hash(state),
        Value::Str(s) | Value::Enum(s) => s.hash(state),
        Value::List(items) => {
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Record(fields) => {
            fields.len().hash(state);
            for (name, field) in fields {
                name.hash(state);
                hash_value(field, state);
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{single}"),
            parts => {
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_from_integer_picks_variant() {
        assert_eq!(Value::from_integer(-3), Value::Int(-3));
        assert_eq!(
            Value::from_integer(i128::from(u64::MAX)),
            Value::UInt(u64::MAX)
        );
    }

    #[test]
    fn test_display_nested() {
        let mut fields = IndexMap::new();
        fields.insert("Id".to_owned(), Value::Int(1));
        fields.insert(
            "Tags".to_owned(),
            Value::List(vec![Value::Str("a".into()), Value::Null]),
        );
        let value = Value::Record(fields);

        assert_eq!(value.to_string(), "{Id: 1, Tags: [a, null]}");
        assert_eq!(value.get("Id"), Some(&Value::Int(1)));
        assert_eq!(value.get("Missing"), None);
    }

    #[test]
    fn test_key_equality_normalizes_floats() {
        let positive = Key(vec![Value::Int(1), Value::Float(0.0)]);
        let negative = Key(vec![Value::Int(1), Value::Float(-0.0)]);
        assert_eq!(positive, negative);

        let mut seen = HashSet::new();
        assert!(seen.insert(positive));
        assert!(!seen.insert(negative));
        assert!(!seen.insert(Key(vec![Value::Int(1), Value::Float(-0.0)])));
        assert!(seen.insert(Key(vec![Value::Int(1), Value::Float(0.5)])));
        assert!(seen.insert(Key(vec![Value::Int(1), Value::Str("0".into())])));

        assert_eq!(
            Key(vec![Value::Float(f64::NAN)]),
            Key(vec![Value::Float(-f64::NAN)])
        );
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key(vec![Value::Int(1)]).to_string(), "1");
        assert_eq!(
            Key(vec![Value::Int(1), Value::Enum("Fire".into())]).to_string(),
            "(1, Fire)"
        );
    }
}
