//! Grammar for `Type` cells.
//!
//! ```text
//! type   := atom '?'?
//! atom   := 'List' '<' type '>' | ident
//! ident  := [A-Za-z_][A-Za-z0-9_]*
//! ```
//!
//! Whitespace is allowed between tokens. Identifiers that match a scalar
//! keyword become [`TypeExpr::Scalar`]; everything else is a named type to
//! be resolved later.

use winnow::{
    Parser as _,
    ascii::multispace0,
    error::{ContextError, ErrMode},
    token::{one_of, take_while},
};

use sheetdata_core::schema::{ScalarType, TypeExpr};

type Input<'src> = &'src str;
type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

const LIST: &str = "List";

fn identifier<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn atom(input: &mut Input<'_>) -> IResult<TypeExpr> {
    multispace0.parse_next(input)?;
    let name = identifier.parse_next(input)?;
    multispace0.parse_next(input)?;

    if name == LIST && input.starts_with('<') {
        '<'.parse_next(input)?;
        let inner = type_expr.parse_next(input)?;
        multispace0.parse_next(input)?;
        '>'.parse_next(input)?;
        return Ok(TypeExpr::List(Box::new(inner)));
    }

    Ok(match ScalarType::from_keyword(name) {
        Some(scalar) => TypeExpr::Scalar(scalar),
        None => TypeExpr::Named(name.to_owned()),
    })
}

fn type_expr(input: &mut Input<'_>) -> IResult<TypeExpr> {
    let atom = atom.parse_next(input)?;
    multispace0.parse_next(input)?;
    if input.starts_with('?') {
        '?'.parse_next(input)?;
        return Ok(TypeExpr::Nullable(Box::new(atom)));
    }
    Ok(atom)
}

/// Parse the full text of a `Type` cell.
///
/// Returns `None` when the text is not a single well-formed type.
pub(crate) fn parse_type(text: &str) -> Option<TypeExpr> {
    let mut input = text;
    let ty = type_expr.parse_next(&mut input).ok()?;
    if !input.trim().is_empty() {
        return None;
    }
    Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: ScalarType) -> TypeExpr {
        TypeExpr::Scalar(s)
    }

    #[test]
    fn test_scalars_and_names() {
        assert_eq!(parse_type("int"), Some(scalar(ScalarType::Int)));
        assert_eq!(parse_type(" string "), Some(scalar(ScalarType::String)));
        assert_eq!(parse_type("Grade"), Some(TypeExpr::Named("Grade".into())));
        assert_eq!(parse_type("List"), Some(TypeExpr::Named("List".into())));
    }

    #[test]
    fn test_list_and_nullable() {
        assert_eq!(
            parse_type("List<int>"),
            Some(TypeExpr::List(Box::new(scalar(ScalarType::Int))))
        );
        assert_eq!(
            parse_type("List < Icon? >"),
            Some(TypeExpr::List(Box::new(TypeExpr::Nullable(Box::new(
                TypeExpr::Named("Icon".into())
            )))))
        );
        assert_eq!(
            parse_type("int?"),
            Some(TypeExpr::Nullable(Box::new(scalar(ScalarType::Int))))
        );
        assert_eq!(
            parse_type("List<List<byte>>"),
            Some(TypeExpr::List(Box::new(TypeExpr::List(Box::new(scalar(
                ScalarType::Byte
            ))))))
        );
    }

    #[test]
    fn test_rejects_malformed() {
        for text in ["", "List<int", "int??", "List<>", "1abc", "int string", "Dictionary<int, int>"] {
            assert_eq!(parse_type(text), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["int", "List<int?>", "Grade?", "List<List<Icon>>"] {
            let ty = parse_type(text).unwrap();
            assert_eq!(ty.to_string(), text);
        }
    }
}
