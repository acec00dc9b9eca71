//! Dynamic EDN value type.

use std::fmt;

/// A namespaced or bare keyword such as `:db/ident` or `:find`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Keyword {
    namespace: Option<String>,
    name: String,
}

impl Keyword {
    /// Creates a keyword without a namespace.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Creates a keyword `namespace/name`.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Parses `ns/name`, `name`, or either with a leading colon.
    ///
    /// The namespace ends at the first `/`, so `:db.type/ref` splits into
    /// `db.type` and `ref`. A lone `/` is kept as a bare name.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix(':').unwrap_or(text);
        match text.split_once('/') {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() => Self::namespaced(ns, name),
            _ => Self::bare(text),
        }
    }

    /// Returns the namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `ns/name` (or `name`) without the leading colon.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, ":{ns}/{}", self.name),
            None => write!(f, ":{}", self.name),
        }
    }
}

/// A symbol such as `?e` or `$`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from its printed form.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a query variable, adding the `?` prefix.
    pub fn var(name: &str) -> Self {
        Self(format!("?{name}"))
    }

    /// The implicit data-source symbol `$`.
    pub fn source() -> Self {
        Self("$".to_string())
    }

    /// Returns the printed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dynamic EDN value.
///
/// Maps keep insertion order: artifacts produced by the mapper are
/// compared and printed in the order their keys were assembled.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `nil`.
    Nil,
    /// `true` / `false`.
    Bool(bool),
    /// 64-bit integer.
    Integer(i64),
    /// Double precision float.
    Float(f64),
    /// Arbitrary precision decimal, kept as its digit string (`1.50M`).
    BigDec(String),
    /// String literal.
    Text(String),
    /// Keyword.
    Keyword(Keyword),
    /// Symbol.
    Symbol(Symbol),
    /// `[...]`.
    Vector(Vec<Value>),
    /// `(...)`.
    List(Vec<Value>),
    /// `#{...}`, in the order the elements were read or built.
    Set(Vec<Value>),
    /// `{...}` with insertion-ordered pairs.
    Map(Vec<(Value, Value)>),
    /// Tagged element `#tag value`.
    Tagged(String, Box<Value>),
}

impl Value {
    /// Creates a keyword value `namespace/name`.
    pub fn keyword(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Value::Keyword(Keyword::namespaced(namespace, name))
    }

    /// Creates a symbol value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    /// Creates a tagged element.
    pub fn tagged(tag: impl Into<String>, value: Value) -> Self {
        Value::Tagged(tag.into(), Box::new(value))
    }

    /// Short human name of this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::BigDec(_) => "bigdec",
            Value::Text(_) => "string",
            Value::Keyword(_) => "keyword",
            Value::Symbol(_) => "symbol",
            Value::Vector(_) => "vector",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Tagged(..) => "tagged element",
        }
    }

    /// Check if this value is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a string, if it is a string literal.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a keyword, if it is one.
    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Value::Keyword(k) => Some(k),
            _ => None,
        }
    }

    /// Get the elements of a vector, list or set.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Vector(items) | Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Get the tag and inner value of a tagged element.
    pub fn as_tagged(&self) -> Option<(&str, &Value)> {
        match self {
            Value::Tagged(tag, inner) => Some((tag, inner)),
            _ => None,
        }
    }

    /// Look up a keyword key in this map value.
    pub fn get(&self, key: &Keyword) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_keyword() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Keyword> for Value {
    fn from(k: Keyword) -> Self {
        Value::Keyword(k)
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Vector(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Nil
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_parse_splits_on_first_slash() {
        let k = Keyword::parse(":db.type/ref");
        assert_eq!(k.namespace(), Some("db.type"));
        assert_eq!(k.name(), "ref");

        let bare = Keyword::parse("find");
        assert_eq!(bare.namespace(), None);
        assert_eq!(bare.name(), "find");

        assert_eq!(Keyword::parse("/").name(), "/");
    }

    #[test]
    fn keyword_display() {
        assert_eq!(Keyword::namespaced("person", "name").to_string(), ":person/name");
        assert_eq!(Keyword::bare("where").to_string(), ":where");
        assert_eq!(
            Keyword::namespaced("db.part", "db").qualified_name(),
            "db.part/db"
        );
    }

    #[test]
    fn symbol_helpers() {
        assert_eq!(Symbol::var("e").as_str(), "?e");
        assert_eq!(Symbol::source().to_string(), "$");
    }

    #[test]
    fn map_get_by_keyword() {
        let map = Value::Map(vec![
            (Value::keyword("db", "id"), Value::Integer(7)),
            (Value::keyword("person", "name"), Value::from("Ann")),
        ]);

        assert_eq!(
            map.get(&Keyword::namespaced("person", "name")),
            Some(&Value::from("Ann"))
        );
        assert_eq!(map.get(&Keyword::namespaced("person", "age")), None);
        assert_eq!(Value::Nil.get(&Keyword::bare("x")), None);
    }

    #[test]
    fn value_accessors() {
        assert!(Value::Nil.is_nil());
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(42).as_integer(), Some(42));
        assert_eq!(Value::from("x").as_text(), Some("x"));
        assert_eq!(Value::List(vec![Value::Nil]).as_seq().map(<[Value]>::len), Some(1));
        assert_eq!(Value::Integer(1).as_seq(), None);

        let tagged = Value::tagged("inst", Value::from("2024-01-01T00:00:00Z"));
        let (tag, inner) = tagged.as_tagged().unwrap();
        assert_eq!(tag, "inst");
        assert_eq!(inner.kind(), "string");
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i32), Value::Integer(42));
        assert_eq!(Value::from(1.5f64), Value::Float(1.5));
        assert_eq!(Value::from(None::<i64>), Value::Nil);
        assert_eq!(Value::from(Some(3i64)), Value::Integer(3));
        assert_eq!(
            Value::from(vec![1i64, 2]),
            Value::Vector(vec![Value::Integer(1), Value::Integer(2)])
        );
        assert_eq!(Value::from(()), Value::Nil);
    }
}
