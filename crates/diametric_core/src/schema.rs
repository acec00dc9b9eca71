//! Schema compilation.
//!
//! Every declared attribute becomes one schema-assertion map. The map
//! starts from the installation defaults, receives the attribute's ident
//! and value type, and finally its namespaced options, which override
//! the defaults in place:
//!
//! ```text
//! {:db/id #db/id [:db.part/db]
//!  :db/cardinality :db.cardinality/one
//!  :db.install/_attribute :db.part/db
//!  :db/ident :person/name
//!  :db/valueType :db.type/string}
//! ```

use crate::config::db_partition;
use crate::entity::{AttributeDeclaration, EntityTypeDescriptor, CARDINALITY, UNIQUE};
use crate::error::{CoreError, CoreResult};
use crate::namespace::qualify;
use crate::tempid::TempId;
use diametric_edn::{Keyword, ToEdn, Value};
use tracing::debug;

/// Schema-assertion map for one attribute, in key insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRecord {
    entries: Vec<(Keyword, Value)>,
}

impl SchemaRecord {
    fn insert(&mut self, key: Keyword, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Looks up a key.
    pub fn get(&self, key: &Keyword) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The attribute's `:db/ident`.
    pub fn ident(&self) -> Option<&Keyword> {
        self.get(&qualify("db", "ident")).and_then(Value::as_keyword)
    }

    /// The attribute's `:db/valueType`.
    pub fn value_type(&self) -> Option<&Keyword> {
        self.get(&qualify("db", "valueType"))
            .and_then(Value::as_keyword)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[(Keyword, Value)] {
        &self.entries
    }
}

impl ToEdn for SchemaRecord {
    fn to_edn(&self) -> Value {
        Value::Map(
            self.entries
                .iter()
                .map(|(k, v)| (Value::Keyword(k.clone()), v.clone()))
                .collect(),
        )
    }
}

/// Renders compiled records as one schema transaction.
pub fn schema_to_edn(records: &[SchemaRecord]) -> Value {
    Value::Vector(records.iter().map(ToEdn::to_edn).collect())
}

/// Compiles entity type descriptors into schema records.
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    partition: Keyword,
}

impl SchemaCompiler {
    /// Creates a compiler installing attributes into `partition`.
    pub fn new(partition: Keyword) -> Self {
        Self { partition }
    }

    /// One record per declared attribute, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownValueType`] for a type with no store
    /// equivalent and [`CoreError::InvalidAttributeOption`] for a
    /// cardinality or uniqueness outside its enumeration.
    pub fn compile(&self, descriptor: &EntityTypeDescriptor) -> CoreResult<Vec<SchemaRecord>> {
        let records = descriptor
            .declarations()
            .iter()
            .map(|decl| self.compile_attribute(descriptor, decl))
            .collect::<CoreResult<Vec<_>>>()?;
        debug!(
            entity_type = descriptor.name(),
            records = records.len(),
            "compiled schema"
        );
        Ok(records)
    }

    fn compile_attribute(
        &self,
        descriptor: &EntityTypeDescriptor,
        decl: &AttributeDeclaration,
    ) -> CoreResult<SchemaRecord> {
        let value_type = decl
            .value_type()
            .resolve()
            .ok_or_else(|| CoreError::unknown_value_type(decl.name(), decl.value_type().to_string()))?;

        let mut record = SchemaRecord {
            entries: vec![
                (
                    qualify("db", "id"),
                    TempId::unnumbered(self.partition.clone()).to_edn(),
                ),
                (
                    qualify("db", "cardinality"),
                    Value::Keyword(qualify("db.cardinality", "one")),
                ),
                (
                    qualify("db.install", "_attribute"),
                    Value::Keyword(self.partition.clone()),
                ),
            ],
        };
        record.insert(
            qualify("db", "ident"),
            Value::Keyword(descriptor.ident(decl.name())),
        );
        record.insert(qualify("db", "valueType"), Value::Keyword(value_type));

        for (key, value) in decl.options().iter() {
            let value = match key {
                CARDINALITY => Value::Keyword(resolve_enum(
                    decl.name(),
                    key,
                    value,
                    "db.cardinality",
                    &["one", "many"],
                )?),
                UNIQUE => Value::Keyword(resolve_enum(
                    decl.name(),
                    key,
                    value,
                    "db.unique",
                    &["identity", "value"],
                )?),
                _ => value.clone(),
            };
            record.insert(option_key(key), value);
        }

        Ok(record)
    }
}

impl Default for SchemaCompiler {
    fn default() -> Self {
        Self::new(db_partition())
    }
}

/// `db/<key>`, or the key itself when it is already qualified.
fn option_key(key: &str) -> Keyword {
    if key.contains('/') {
        Keyword::parse(key)
    } else {
        qualify("db", key)
    }
}

/// Resolves an option value against `namespace/{allowed}`.
fn resolve_enum(
    attribute: &str,
    option: &str,
    value: &Value,
    namespace: &str,
    allowed: &[&str],
) -> CoreResult<Keyword> {
    let keyword = match value {
        Value::Keyword(k) => Some(k.clone()),
        Value::Text(s) => Some(Keyword::parse(s)),
        Value::Symbol(s) => Some(Keyword::parse(s.as_str())),
        _ => None,
    };
    keyword
        .filter(|k| k.namespace().map_or(true, |ns| ns == namespace))
        .filter(|k| allowed.contains(&k.name()))
        .map(|k| qualify(namespace, k.name()))
        .ok_or_else(|| {
            let printed = diametric_edn::to_edn_string(value).unwrap_or_else(|_| value.kind().to_string());
            CoreError::invalid_option(attribute, option, printed)
        })
}
