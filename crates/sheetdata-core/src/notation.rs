//! Identifier casing conversion.
//!
//! Sheet authors write identifiers in one notation (the configured input
//! notation) while generated code may use another for every category of
//! identifier. Conversion goes through a canonical intermediate form: a list
//! of lowercase word fragments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An identifier casing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notation {
    /// `ItemName`
    #[default]
    Pascal,
    /// `itemName`
    Camel,
    /// `ITEM_NAME`
    UpperSnake,
    /// `item_name`
    LowerSnake,
}

impl Notation {
    /// All supported notations.
    pub const ALL: [Notation; 4] = [
        Notation::Pascal,
        Notation::Camel,
        Notation::UpperSnake,
        Notation::LowerSnake,
    ];

    /// Convert `text` from this notation into `to`.
    pub fn convert(self, text: &str, to: Notation) -> String {
        convert(text, self, to)
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Notation::Pascal => "pascal",
            Notation::Camel => "camel",
            Notation::UpperSnake => "upper_snake",
            Notation::LowerSnake => "lower_snake",
        };
        f.write_str(name)
    }
}

/// Convert an identifier between notations.
///
/// Camel and Pascal text is split before every ASCII uppercase letter; snake
/// text is split on `_`. Empty fragments are dropped. Only ASCII letters
/// change case.
///
/// ```
/// use sheetdata_core::notation::{Notation, convert};
///
/// assert_eq!(convert("item_name", Notation::LowerSnake, Notation::Pascal), "ItemName");
/// assert_eq!(convert("ItemName", Notation::Pascal, Notation::UpperSnake), "ITEM_NAME");
/// assert_eq!(convert("itemName", Notation::Camel, Notation::Pascal), "ItemName");
/// ```
pub fn convert(text: &str, from: Notation, to: Notation) -> String {
    use Notation::*;

    match (from, to) {
        _ if from == to => text.to_owned(),
        (UpperSnake, LowerSnake) => text.to_ascii_lowercase(),
        (LowerSnake, UpperSnake) => text.to_ascii_uppercase(),
        (Camel, Pascal) => with_first(text, char::to_ascii_uppercase),
        (Pascal, Camel) => with_first(text, char::to_ascii_lowercase),
        _ => join(&tokenize(text, from), to),
    }
}

/// Split `text` into lowercase fragments according to `notation`.
pub fn tokenize(text: &str, notation: Notation) -> Vec<String> {
    let lower_snake = match notation {
        Notation::LowerSnake => text.to_owned(),
        Notation::UpperSnake => text.to_ascii_lowercase(),
        Notation::Pascal | Notation::Camel => {
            let mut out = String::with_capacity(text.len() + 4);
            for ch in text.chars() {
                if ch.is_ascii_uppercase() {
                    out.push('_');
                    out.push(ch.to_ascii_lowercase());
                } else {
                    out.push(ch);
                }
            }
            out
        }
    };

    lower_snake
        .split('_')
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Join lowercase fragments into an identifier in `notation`.
pub fn join<S: AsRef<str>>(tokens: &[S], notation: Notation) -> String {
    match notation {
        Notation::LowerSnake => tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("_"),
        Notation::UpperSnake => join(tokens, Notation::LowerSnake).to_ascii_uppercase(),
        Notation::Pascal => tokens
            .iter()
            .map(|t| with_first(t.as_ref(), char::to_ascii_uppercase))
            .collect(),
        Notation::Camel => with_first(&join(tokens, Notation::Pascal), char::to_ascii_lowercase),
    }
}

fn with_first(text: &str, f: impl Fn(&char) -> char) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(text.len());
            out.push(f(&first));
            out.extend(chars);
            out
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_short_circuit() {
        for n in Notation::ALL {
            assert_eq!(convert("weird__Text", n, n), "weird__Text");
        }
    }

    #[test]
    fn test_pascal_to_snake() {
        assert_eq!(
            convert("NameTextId", Notation::Pascal, Notation::LowerSnake),
            "name_text_id"
        );
        assert_eq!(
            convert("NameTextId", Notation::Pascal, Notation::UpperSnake),
            "NAME_TEXT_ID"
        );
    }

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(
            convert("is_primary_key", Notation::LowerSnake, Notation::Camel),
            "isPrimaryKey"
        );
        assert_eq!(
            convert("IS_PRIMARY_KEY", Notation::UpperSnake, Notation::Camel),
            "isPrimaryKey"
        );
    }

    #[test]
    fn test_uppercase_runs_split_per_letter() {
        assert_eq!(tokenize("HPMax", Notation::Pascal), vec!["h", "p", "max"]);
        assert_eq!(
            convert("HPMax", Notation::Pascal, Notation::LowerSnake),
            "h_p_max"
        );
    }

    #[test]
    fn test_digits_stay_with_fragment() {
        assert_eq!(
            convert("Slot2Item", Notation::Pascal, Notation::LowerSnake),
            "slot2_item"
        );
    }

    #[test]
    fn test_empty_fragments_dropped() {
        assert_eq!(
            convert("__a__b_", Notation::LowerSnake, Notation::Pascal),
            "AB"
        );
        assert_eq!(convert("", Notation::LowerSnake, Notation::Pascal), "");
    }

    #[test]
    fn test_deserialize_names() {
        let n: Notation = serde_json::from_str("\"upper_snake\"").unwrap();
        assert_eq!(n, Notation::UpperSnake);
        assert_eq!(Notation::Camel.to_string(), "camel");
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    /// Identifier-safe words: start with a letter so casing is reversible.
    fn words() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..5)
    }

    fn notation() -> impl Strategy<Value = Notation> {
        prop::sample::select(Notation::ALL.to_vec())
    }

    fn check_round_trip(words: &[String], n1: Notation, n2: Notation) -> Result<(), TestCaseError> {
        let s = join(words, n1);
        let there = convert(&s, n1, n2);
        let back = convert(&there, n2, n1);
        prop_assert_eq!(back, s);
        Ok(())
    }

    proptest! {
        #[test]
        fn round_trip(words in words(), n1 in notation(), n2 in notation()) {
            check_round_trip(&words, n1, n2)?;
        }

        #[test]
        fn tokenize_join_is_canonical(words in words(), n in notation()) {
            prop_assert_eq!(tokenize(&join(&words, n), n), words);
        }
    }
}
