//! # Diametric Core
//!
//! Maps typed entity declarations onto a datalog entity-attribute-value
//! store.
//!
//! This crate provides:
//! - Entity type registration with ordered, typed attribute declarations
//! - Schema compilation into the store's attribute-installation maps
//! - Find/in/where query assembly with positional filter arguments
//! - Result-row mapping back into entity instances
//! - Transaction assembly with temporary ids for unpersisted entities
//!
//! Nothing here talks to a store: every artifact is a
//! [`diametric_edn::Value`] handed to an external executor.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entity;
mod error;
mod mapper;
mod namespace;
mod query;
mod result;
mod schema;
mod tempid;
mod transaction;

pub use config::{db_partition, Config, FilterPolicy, DEFAULT_TEMP_ID_SEED};
pub use entity::{
    AttributeDeclaration, AttributeOptions, Cardinality, EntityInstance, EntityRef,
    EntityTypeBuilder, EntityTypeDescriptor, SemanticType, SemanticTyped, Unique, ValueType,
};
pub use error::{CoreError, CoreResult};
pub use mapper::Mapper;
pub use namespace::{prefix_for, qualify};
pub use query::{Clause, Query, QueryBuilder, QueryRequest, ENTITY_VAR};
pub use result::{from_row, from_rows, rows_from_value};
pub use schema::{schema_to_edn, SchemaCompiler, SchemaRecord};
pub use tempid::{TempId, TempIdAllocator, TEMP_ID_TAG};
pub use transaction::{EntityAssertion, Transaction, TransactionBuilder};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
