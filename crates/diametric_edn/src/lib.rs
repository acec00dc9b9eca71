//! # Diametric EDN
//!
//! EDN text encoding/decoding for Diametric.
//!
//! This crate is the wire boundary between the mapping engine and a
//! datalog store: every schema record, query and transaction the engine
//! builds is a [`Value`], and this crate turns values into EDN text and
//! back.
//!
//! ## Rules
//!
//! - Maps keep insertion order and print entries separated by `, `
//! - Floats always print with a decimal point or exponent
//! - NaN and infinities are rejected
//! - Tagged elements (`#db/id [...]`, `#inst "..."`) are kept as
//!   [`Value::Tagged`] and never interpreted by the codec itself
//!
//! ## Usage
//!
//! ```
//! use diametric_edn::{from_edn, to_edn_string, Value};
//!
//! let value = Value::keyword("db.type", "string");
//! let text = to_edn_string(&value).unwrap();
//! assert_eq!(text, ":db.type/string");
//!
//! let decoded = from_edn(&text).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{from_edn, EdnDecoder, MAX_DEPTH};
pub use encoder::{to_edn_string, EdnEncoder};
pub use error::{EdnError, EdnResult};
pub use value::{Keyword, Symbol, Value};

/// Types that have an EDN representation.
pub trait ToEdn {
    /// Convert to an EDN value.
    fn to_edn(&self) -> Value;

    /// Convert straight to EDN text.
    fn to_edn_string(&self) -> EdnResult<String> {
        to_edn_string(&self.to_edn())
    }
}

/// Types that can be rebuilt from an EDN value.
pub trait FromEdn: Sized {
    /// Rebuild from an EDN value.
    fn from_edn(value: &Value) -> EdnResult<Self>;

    /// Parse EDN text and rebuild from it.
    fn from_edn_str(text: &str) -> EdnResult<Self> {
        Self::from_edn(&from_edn(text)?)
    }
}

impl ToEdn for Value {
    fn to_edn(&self) -> Value {
        self.clone()
    }
}

impl FromEdn for Value {
    fn from_edn(value: &Value) -> EdnResult<Self> {
        Ok(value.clone())
    }
}

impl ToEdn for Keyword {
    fn to_edn(&self) -> Value {
        Value::Keyword(self.clone())
    }
}

impl FromEdn for Keyword {
    fn from_edn(value: &Value) -> EdnResult<Self> {
        value
            .as_keyword()
            .cloned()
            .ok_or_else(|| EdnError::unexpected_shape("keyword", value.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn roundtrip_nested() {
        let value = Value::Vector(vec![Value::Map(vec![
            (
                Value::keyword("db", "id"),
                Value::tagged(
                    "db/id",
                    Value::Vector(vec![Value::keyword("db.part", "db")]),
                ),
            ),
            (Value::keyword("db", "ident"), Value::keyword("person", "name")),
            (Value::keyword("db", "doc"), Value::from("A person's name")),
            (Value::keyword("db", "index"), Value::Bool(true)),
        ])]);
        let text = to_edn_string(&value).unwrap();
        assert_eq!(from_edn(&text).unwrap(), value);
    }

    #[test]
    fn keyword_from_edn_rejects_other_kinds() {
        assert_eq!(
            Keyword::from_edn(&Value::Integer(1)),
            Err(EdnError::unexpected_shape("keyword", "integer"))
        );
        assert_eq!(
            Keyword::from_edn_str(":a/b").unwrap(),
            Keyword::namespaced("a", "b")
        );
    }

    proptest! {
        #[test]
        fn text_survives_encoding(s in ".*") {
            let value = Value::Text(s);
            let text = to_edn_string(&value).unwrap();
            prop_assert_eq!(from_edn(&text).unwrap(), value);
        }

        #[test]
        fn integers_survive_encoding(n in any::<i64>()) {
            let text = to_edn_string(&Value::Integer(n)).unwrap();
            prop_assert_eq!(from_edn(&text).unwrap(), Value::Integer(n));
        }
    }
}
