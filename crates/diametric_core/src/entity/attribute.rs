//! Attribute declarations.

use diametric_edn::{Keyword, Value};
use std::fmt;
use std::str::FromStr;

/// Namespace of the store's value type idents.
pub const VALUE_TYPE_NAMESPACE: &str = "db.type";

/// Value types the store understands, by local name.
const STORE_VALUE_TYPES: &[&str] = &[
    "keyword", "string", "boolean", "long", "bigint", "float", "double", "bigdec", "ref",
    "instant", "uuid", "uri", "bytes", "symbol", "tuple",
];

/// The value types an attribute can be declared with directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    /// `:db.type/keyword`
    Keyword,
    /// `:db.type/string`
    String,
    /// `:db.type/long`
    Long,
    /// `:db.type/float`
    Float,
    /// `:db.type/bigdec`
    BigDec,
    /// `:db.type/instant`
    Instant,
    /// `:db.type/uri`
    Uri,
}

impl SemanticType {
    /// Local name under `db.type`.
    pub const fn token(self) -> &'static str {
        match self {
            SemanticType::Keyword => "keyword",
            SemanticType::String => "string",
            SemanticType::Long => "long",
            SemanticType::Float => "float",
            SemanticType::BigDec => "bigdec",
            SemanticType::Instant => "instant",
            SemanticType::Uri => "uri",
        }
    }

    /// The store ident, e.g. `:db.type/long`.
    pub fn ident(self) -> Keyword {
        Keyword::namespaced(VALUE_TYPE_NAMESPACE, self.token())
    }
}

impl FromStr for SemanticType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyword" => Ok(SemanticType::Keyword),
            "string" => Ok(SemanticType::String),
            "long" => Ok(SemanticType::Long),
            "float" => Ok(SemanticType::Float),
            "bigdec" | "big-decimal" => Ok(SemanticType::BigDec),
            "instant" => Ok(SemanticType::Instant),
            "uri" => Ok(SemanticType::Uri),
            _ => Err(()),
        }
    }
}

/// Rust types with a natural semantic value type.
pub trait SemanticTyped {
    /// The value type attributes holding this type are declared with.
    const SEMANTIC_TYPE: SemanticType;
}

impl SemanticTyped for String {
    const SEMANTIC_TYPE: SemanticType = SemanticType::String;
}

impl SemanticTyped for &str {
    const SEMANTIC_TYPE: SemanticType = SemanticType::String;
}

impl SemanticTyped for i64 {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Long;
}

impl SemanticTyped for i32 {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Long;
}

impl SemanticTyped for f64 {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Float;
}

impl SemanticTyped for f32 {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Float;
}

impl SemanticTyped for Keyword {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Keyword;
}

/// Declared value type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// One of the semantic types.
    Semantic(SemanticType),
    /// A store type token, bare (`ref`) or qualified (`db.type/ref`).
    /// Checked when the schema is compiled.
    Token(String),
}

impl ValueType {
    /// The semantic type for a Rust type.
    pub fn of<T: SemanticTyped>() -> Self {
        ValueType::Semantic(T::SEMANTIC_TYPE)
    }

    /// Resolves to the store's value type ident.
    ///
    /// Returns `None` for tokens the store does not know.
    pub fn resolve(&self) -> Option<Keyword> {
        match self {
            ValueType::Semantic(t) => Some(t.ident()),
            ValueType::Token(token) => {
                let keyword = Keyword::parse(token);
                let known = STORE_VALUE_TYPES.contains(&keyword.name());
                match keyword.namespace() {
                    None if known => Some(Keyword::namespaced(VALUE_TYPE_NAMESPACE, keyword.name())),
                    Some(VALUE_TYPE_NAMESPACE) if known => Some(keyword),
                    _ => None,
                }
            }
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Semantic(t) => f.write_str(t.token()),
            ValueType::Token(token) => f.write_str(token),
        }
    }
}

impl From<SemanticType> for ValueType {
    fn from(t: SemanticType) -> Self {
        ValueType::Semantic(t)
    }
}

impl From<&str> for ValueType {
    fn from(token: &str) -> Self {
        token
            .parse::<SemanticType>()
            .map_or_else(|()| ValueType::Token(token.to_string()), ValueType::Semantic)
    }
}

impl From<String> for ValueType {
    fn from(token: String) -> Self {
        ValueType::from(token.as_str())
    }
}

/// Attribute cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Single value.
    One,
    /// Set of values.
    Many,
}

impl Cardinality {
    /// Local name under `db.cardinality`.
    pub const fn token(self) -> &'static str {
        match self {
            Cardinality::One => "one",
            Cardinality::Many => "many",
        }
    }
}

/// Attribute uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unique {
    /// Upserting identity.
    Identity,
    /// Unique value, conflicting writes fail.
    Value,
}

impl Unique {
    /// Local name under `db.unique`.
    pub const fn token(self) -> &'static str {
        match self {
            Unique::Identity => "identity",
            Unique::Value => "value",
        }
    }
}

/// Option key for cardinality.
pub const CARDINALITY: &str = "cardinality";
/// Option key for uniqueness.
pub const UNIQUE: &str = "unique";

/// Ordered attribute options, keyed by local option name.
///
/// Setting a key twice replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeOptions {
    entries: Vec<(String, Value)>,
}

impl AttributeOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an arbitrary option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets an arbitrary option in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Sets `cardinality`.
    #[must_use]
    pub fn cardinality(self, cardinality: Cardinality) -> Self {
        self.with(CARDINALITY, Keyword::bare(cardinality.token()))
    }

    /// Sets `unique`.
    #[must_use]
    pub fn unique(self, unique: Unique) -> Self {
        self.with(UNIQUE, Keyword::bare(unique.token()))
    }

    /// Sets `doc`.
    #[must_use]
    pub fn doc(self, doc: impl Into<String>) -> Self {
        let doc: String = doc.into();
        self.with("doc", doc)
    }

    /// Sets `index`.
    #[must_use]
    pub fn index(self, index: bool) -> Self {
        self.with("index", index)
    }

    /// Sets `fulltext`.
    #[must_use]
    pub fn fulltext(self, fulltext: bool) -> Self {
        self.with("fulltext", fulltext)
    }

    /// Sets `isComponent`.
    #[must_use]
    pub fn component(self, component: bool) -> Self {
        self.with("isComponent", component)
    }

    /// Sets `noHistory`.
    #[must_use]
    pub fn no_history(self, no_history: bool) -> Self {
        self.with("noHistory", no_history)
    }

    /// Looks up an option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterates options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no option is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttributeOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (k, v) in iter {
            options.set(k, v);
        }
        options
    }
}

/// One declared attribute of an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDeclaration {
    name: String,
    value_type: ValueType,
    options: AttributeOptions,
}

impl AttributeDeclaration {
    /// Creates a declaration.
    pub fn new(
        name: impl Into<String>,
        value_type: impl Into<ValueType>,
        options: AttributeOptions,
    ) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            options,
        }
    }

    /// Attribute name, local to its entity type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value type.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Declared options.
    pub fn options(&self) -> &AttributeOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_types_resolve_under_db_type() {
        assert_eq!(
            ValueType::from(SemanticType::BigDec).resolve(),
            Some(Keyword::namespaced("db.type", "bigdec"))
        );
        assert_eq!(
            ValueType::of::<String>().resolve(),
            Some(Keyword::namespaced("db.type", "string"))
        );
        assert_eq!(ValueType::of::<i64>(), ValueType::Semantic(SemanticType::Long));
        assert_eq!(ValueType::of::<f64>(), ValueType::Semantic(SemanticType::Float));
    }

    #[test]
    fn tokens_parse_to_semantic_types_when_possible() {
        assert_eq!(ValueType::from("string"), ValueType::Semantic(SemanticType::String));
        assert_eq!(
            ValueType::from("big-decimal"),
            ValueType::Semantic(SemanticType::BigDec)
        );
        assert_eq!(ValueType::from("ref"), ValueType::Token("ref".into()));
    }

    #[test]
    fn store_tokens_resolve() {
        let db_ref = Some(Keyword::namespaced("db.type", "ref"));
        assert_eq!(ValueType::from("ref").resolve(), db_ref);
        assert_eq!(ValueType::from("db.type/ref").resolve(), db_ref);
        assert_eq!(ValueType::from(":db.type/ref").resolve(), db_ref);
    }

    #[test]
    fn unknown_tokens_do_not_resolve() {
        assert_eq!(ValueType::from("widget").resolve(), None);
        assert_eq!(ValueType::from("db.type/widget").resolve(), None);
        assert_eq!(ValueType::from("app/ref").resolve(), None);
        assert_eq!(ValueType::from("").resolve(), None);
    }

    #[test]
    fn options_keep_order_and_replace_in_place() {
        let options = AttributeOptions::new()
            .doc("first")
            .cardinality(Cardinality::Many)
            .doc("second");

        let keys: Vec<_> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["doc", "cardinality"]);
        assert_eq!(options.get("doc"), Some(&Value::from("second")));
        assert_eq!(
            options.get(CARDINALITY),
            Some(&Value::Keyword(Keyword::bare("many")))
        );
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn options_from_iter() {
        let options: AttributeOptions = vec![("index", true), ("fulltext", false)]
            .into_iter()
            .collect();
        assert_eq!(options.get("index"), Some(&Value::Bool(true)));
        assert!(!options.is_empty());
    }

    #[test]
    fn declaration_accessors() {
        let decl = AttributeDeclaration::new(
            "email",
            SemanticType::String,
            AttributeOptions::new().unique(Unique::Identity),
        );
        assert_eq!(decl.name(), "email");
        assert_eq!(decl.value_type().to_string(), "string");
        assert_eq!(
            decl.options().get(UNIQUE),
            Some(&Value::Keyword(Keyword::bare("identity")))
        );
    }
}
