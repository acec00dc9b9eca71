//! JSON entity definition files.
//!
//! ```json
//! {
//!   "partition": "db.part/user",
//!   "entities": [
//!     {
//!       "name": "Person",
//!       "attributes": [
//!         { "name": "name", "type": "string", "options": { "unique": "identity" } },
//!         { "name": "age", "type": "long" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use diametric_core::{AttributeOptions, Config, Mapper};
use diametric_edn::{Keyword, Value};
use serde::Deserialize;
use std::path::Path;

/// Top-level definition file.
#[derive(Debug, Deserialize)]
pub struct Definition {
    /// Default partition for every entity type.
    #[serde(default)]
    pub partition: Option<String>,
    /// Entity types, registered in file order.
    pub entities: Vec<EntityDefinition>,
}

/// One entity type.
#[derive(Debug, Deserialize)]
pub struct EntityDefinition {
    /// Type name; the attribute prefix is derived from it.
    pub name: String,
    /// Prefix override.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Partition override.
    #[serde(default)]
    pub partition: Option<String>,
    /// Attributes in declaration order.
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
}

/// One attribute.
#[derive(Debug, Deserialize)]
pub struct AttributeDefinition {
    /// Attribute name.
    pub name: String,
    /// Value type token (`string`, `long`, `ref`, ...).
    #[serde(rename = "type")]
    pub value_type: String,
    /// Schema options (`cardinality`, `unique`, `doc`, ...).
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl Definition {
    /// Reads and parses a definition file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Registers every entity type with a new mapper.
    pub fn into_mapper(self) -> Result<Mapper, Box<dyn std::error::Error>> {
        let mut config = Config::new();
        if let Some(partition) = &self.partition {
            config = config.default_partition(partition);
        }
        let mut mapper = Mapper::new(config);

        for entity in self.entities {
            let mut builder = mapper.define(entity.name);
            if let Some(prefix) = entity.prefix {
                builder = builder.prefix(prefix);
            }
            if let Some(partition) = &entity.partition {
                builder = builder.partition(partition);
            }
            for attribute in entity.attributes {
                let options: AttributeOptions = attribute
                    .options
                    .into_iter()
                    .map(|(k, v)| (k, json_to_edn(v)))
                    .collect();
                builder = builder.attribute(attribute.name, attribute.value_type, options);
            }
            mapper.register(builder)?;
        }

        Ok(mapper)
    }
}

/// Converts a JSON value into the closest EDN value. Object keys become
/// keywords.
pub fn json_to_edn(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => {
            Value::Vector(items.into_iter().map(json_to_edn).collect())
        }
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (Value::Keyword(Keyword::parse(&k)), json_to_edn(v)))
                .collect(),
        ),
    }
}
