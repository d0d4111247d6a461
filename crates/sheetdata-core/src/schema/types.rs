//! Type expressions and resolved field types.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::value::Value;

/// Built-in scalar types available in element `Type` cells.
///
/// Deserializes from its lowercase keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Byte,
    SByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
    Char,
    String,
}

impl ScalarType {
    /// Every scalar keyword, in declaration order.
    pub const ALL: [ScalarType; 14] = [
        ScalarType::Bool,
        ScalarType::Byte,
        ScalarType::SByte,
        ScalarType::Short,
        ScalarType::UShort,
        ScalarType::Int,
        ScalarType::UInt,
        ScalarType::Long,
        ScalarType::ULong,
        ScalarType::Float,
        ScalarType::Double,
        ScalarType::Decimal,
        ScalarType::Char,
        ScalarType::String,
    ];

    /// Returns the source keyword for this type.
    pub fn keyword(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Byte => "byte",
            ScalarType::SByte => "sbyte",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Long => "long",
            ScalarType::ULong => "ulong",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Decimal => "decimal",
            ScalarType::Char => "char",
            ScalarType::String => "string",
        }
    }

    /// Look up a scalar by its keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.keyword() == keyword)
    }

    /// Returns the inclusive value range of integer types.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range: (i128, i128) = match self {
            ScalarType::Byte => (u8::MIN.into(), u8::MAX.into()),
            ScalarType::SByte => (i8::MIN.into(), i8::MAX.into()),
            ScalarType::Short => (i16::MIN.into(), i16::MAX.into()),
            ScalarType::UShort => (u16::MIN.into(), u16::MAX.into()),
            ScalarType::Int => (i32::MIN.into(), i32::MAX.into()),
            ScalarType::UInt => (u32::MIN.into(), u32::MAX.into()),
            ScalarType::Long => (i64::MIN.into(), i64::MAX.into()),
            ScalarType::ULong => (u64::MIN.into(), u64::MAX.into()),
            _ => return None,
        };
        Some(range)
    }

    /// Returns `true` for the integer types usable as enum backing types.
    pub fn is_integer(self) -> bool {
        self.integer_range().is_some()
    }

    /// The value of a default-constructed instance.
    pub fn zero(self) -> Value {
        match self {
            ScalarType::Bool => Value::Bool(false),
            ScalarType::ULong => Value::UInt(0),
            ScalarType::Float | ScalarType::Double | ScalarType::Decimal => Value::Float(0.0),
            ScalarType::Char => Value::Str("\0".to_owned()),
            ScalarType::String => Value::Str(String::new()),
            _ => Value::Int(0),
        }
    }

    /// Convert cell text into a value of this type.
    ///
    /// Surrounding whitespace is ignored for every type except `string`,
    /// which keeps the text as written.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] when the text is not a valid literal or an
    /// integer is out of range.
    pub fn parse(self, text: &str) -> Result<Value, ConvertError> {
        let trimmed = text.trim();
        let fail = || ConvertError::new(self, text);

        if let Some((min, max)) = self.integer_range() {
            let n: i128 = trimmed.parse().map_err(|_| fail())?;
            if n < min || n > max {
                return Err(fail());
            }
            return Ok(Value::from_integer(n));
        }

        match self {
            ScalarType::Bool => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(fail())
                }
            }
            ScalarType::Float | ScalarType::Double | ScalarType::Decimal => {
                let f: f64 = trimmed.parse().map_err(|_| fail())?;
                if !f.is_finite() {
                    return Err(fail());
                }
                if self == ScalarType::Float && f.abs() > f64::from(f32::MAX) {
                    return Err(fail());
                }
                Ok(Value::Float(f))
            }
            ScalarType::Char => {
                let mut chars = trimmed.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Str(c.to_string())),
                    _ => Err(fail()),
                }
            }
            ScalarType::String => Ok(Value::Str(text.to_owned())),
            _ => Err(fail()),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Cell text that does not convert to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{text}` is not a valid `{expected}` value")]
pub struct ConvertError {
    pub expected: String,
    pub text: String,
}

impl ConvertError {
    pub fn new(expected: impl fmt::Display, text: impl Into<String>) -> Self {
        Self {
            expected: expected.to_string(),
            text: text.into(),
        }
    }
}

/// A type as written in a `Type` cell, before name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Scalar(ScalarType),
    /// An enum or record name, in input notation.
    Named(String),
    List(Box<TypeExpr>),
    Nullable(Box<TypeExpr>),
}

impl TypeExpr {
    /// Returns `true` if the outermost constructor is `List<..>`.
    pub fn is_list(&self) -> bool {
        matches!(self, TypeExpr::List(_))
    }

    /// Returns `true` if the outermost constructor is `T?`.
    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeExpr::Nullable(_))
    }

    /// Returns the innermost scalar or named type.
    pub fn leaf(&self) -> &TypeExpr {
        match self {
            TypeExpr::List(inner) | TypeExpr::Nullable(inner) => inner.leaf(),
            other => other,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Scalar(s) => write!(f, "{s}"),
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::List(inner) => write!(f, "List<{inner}>"),
            TypeExpr::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

/// A fully resolved field type.
///
/// Enum and record types are referred to by their declared (input notation)
/// names; their definitions live in the type catalog of the compilation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Scalar(ScalarType),
    Enum(String),
    Record(String),
    List(Box<FieldType>),
    Nullable(Box<FieldType>),
    /// A foreign key into the entity named `target`. Data is the key itself.
    Reference { key: Box<FieldType>, target: String },
}

impl FieldType {
    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List(_))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldType::Nullable(_))
    }

    /// The type stored in cells: references store their key type.
    pub fn storage(&self) -> &FieldType {
        match self {
            FieldType::Reference { key, .. } => key.storage(),
            other => other,
        }
    }

    /// The element type of a list, if this is a list.
    pub fn list_element(&self) -> Option<&FieldType> {
        match self {
            FieldType::List(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{s}"),
            FieldType::Enum(name) | FieldType::Record(name) => f.write_str(name),
            FieldType::List(inner) => write!(f, "List<{inner}>"),
            FieldType::Nullable(inner) => write!(f, "{inner}?"),
            FieldType::Reference { key, .. } => write!(f, "{key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for s in ScalarType::ALL {
            assert_eq!(ScalarType::from_keyword(s.keyword()), Some(s));
        }
        assert_eq!(ScalarType::from_keyword("Int"), None);
    }

    #[test]
    fn test_parse_integers_checks_range() {
        assert_eq!(ScalarType::Byte.parse("255"), Ok(Value::Int(255)));
        assert!(ScalarType::Byte.parse("256").is_err());
        assert!(ScalarType::SByte.parse("-129").is_err());
        assert_eq!(ScalarType::Int.parse(" -7 "), Ok(Value::Int(-7)));
        assert_eq!(
            ScalarType::ULong.parse("18446744073709551615"),
            Ok(Value::UInt(u64::MAX))
        );
        assert!(ScalarType::Int.parse("1.5").is_err());
    }

    #[test]
    fn test_parse_bool_any_case() {
        assert_eq!(ScalarType::Bool.parse("TRUE"), Ok(Value::Bool(true)));
        assert_eq!(ScalarType::Bool.parse("False"), Ok(Value::Bool(false)));
        let err = ScalarType::Bool.parse("yes").unwrap_err();
        assert_eq!(err.to_string(), "`yes` is not a valid `bool` value");
    }

    #[test]
    fn test_parse_floats_and_chars() {
        assert_eq!(ScalarType::Float.parse("1.5"), Ok(Value::Float(1.5)));
        assert!(ScalarType::Double.parse("NaN").is_err());
        assert!(ScalarType::Float.parse("1e300").is_err());
        assert_eq!(ScalarType::Char.parse("x"), Ok(Value::Str("x".into())));
        assert!(ScalarType::Char.parse("xy").is_err());
    }

    #[test]
    fn test_string_keeps_whitespace() {
        assert_eq!(ScalarType::String.parse(" a "), Ok(Value::Str(" a ".into())));
    }

    #[test]
    fn test_type_expr_display() {
        let ty = TypeExpr::List(Box::new(TypeExpr::Nullable(Box::new(TypeExpr::Scalar(
            ScalarType::Int,
        )))));
        assert_eq!(ty.to_string(), "List<int?>");
        assert_eq!(ty.leaf(), &TypeExpr::Scalar(ScalarType::Int));
        assert!(ty.is_list());
    }

    #[test]
    fn test_reference_storage() {
        let ty = FieldType::Reference {
            key: Box::new(FieldType::Scalar(ScalarType::Int)),
            target: "Text".into(),
        };
        assert_eq!(ty.storage(), &FieldType::Scalar(ScalarType::Int));
        assert_eq!(ty.to_string(), "int");
    }

    #[test]
    fn test_deserialize_keyword() {
        let ty: ScalarType = serde_json::from_str("\"ushort\"").unwrap();
        assert_eq!(ty, ScalarType::UShort);
        assert!(serde_json::from_str::<ScalarType>("\"UShort\"").is_err());
    }
}
