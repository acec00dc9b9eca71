//! Error types for Diametric core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while mapping entities.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// EDN codec error.
    #[error("codec error: {0}")]
    Edn(#[from] diametric_edn::EdnError),

    /// Declared value type has no store equivalent.
    #[error("unknown value type {value_type:?} for attribute {attribute:?}")]
    UnknownValueType {
        /// Attribute carrying the type.
        attribute: String,
        /// The type token as declared.
        value_type: String,
    },

    /// Attribute declared twice on one entity type.
    #[error("attribute {attribute:?} is already declared on {entity_type}")]
    DuplicateAttribute {
        /// Entity type name.
        entity_type: String,
        /// The repeated attribute name.
        attribute: String,
    },

    /// Attribute or filter key uses the name of the query's entity
    /// variable.
    #[error("{name:?} is reserved for the entity variable and cannot be used on {entity_type}")]
    ReservedName {
        /// Entity type name.
        entity_type: String,
        /// The rejected name.
        name: String,
    },

    /// Option value outside its enumeration (e.g. `cardinality: :some`).
    #[error("invalid value for option {option:?} on attribute {attribute:?}: {value}")]
    InvalidAttributeOption {
        /// Attribute carrying the option.
        attribute: String,
        /// Option key.
        option: String,
        /// The rejected value, printed.
        value: String,
    },

    /// Name is not a declared attribute of the entity type.
    #[error("{entity_type} has no attribute {attribute:?}")]
    UnknownAttribute {
        /// Entity type name.
        entity_type: String,
        /// The attribute name asked for.
        attribute: String,
    },

    /// Filter key is not a declared attribute and the policy rejects it.
    #[error("filter parameter {parameter:?} does not match an attribute of {entity_type}")]
    UnknownFilterParameter {
        /// Entity type name.
        entity_type: String,
        /// The filter key.
        parameter: String,
    },

    /// Same filter key given twice.
    #[error("filter parameter {parameter:?} given more than once")]
    DuplicateFilterParameter {
        /// The repeated key.
        parameter: String,
    },

    /// Result row shorter than `1 + attribute count`.
    #[error("result row for {entity_type} has {actual} elements, expected at least {expected}")]
    MalformedResultRow {
        /// Entity type name.
        entity_type: String,
        /// Minimum element count.
        expected: usize,
        /// Element count received.
        actual: usize,
    },

    /// Entity id position holds something other than an integer.
    #[error("entity id must be an integer, got {kind}")]
    InvalidEntityId {
        /// Kind of the value found.
        kind: String,
    },

    /// Persisted id already set to a different value.
    #[error("instance already persisted as {existing}, cannot assign {requested}")]
    AlreadyPersisted {
        /// Current persisted id.
        existing: i64,
        /// Id that was rejected.
        requested: i64,
    },

    /// Entity type name registered twice with a mapper.
    #[error("entity type {name} is already registered")]
    DuplicateEntityType {
        /// Type name.
        name: String,
    },

    /// Entity type name not registered with the mapper.
    #[error("entity type {name} is not registered")]
    UnknownEntityType {
        /// Type name.
        name: String,
    },
}

impl CoreError {
    /// Creates an unknown value type error.
    pub fn unknown_value_type(attribute: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self::UnknownValueType {
            attribute: attribute.into(),
            value_type: value_type.into(),
        }
    }

    /// Creates an unknown attribute error.
    pub fn unknown_attribute(entity_type: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            entity_type: entity_type.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute option error.
    pub fn invalid_option(
        attribute: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttributeOption {
            attribute: attribute.into(),
            option: option.into(),
            value: value.into(),
        }
    }
}
