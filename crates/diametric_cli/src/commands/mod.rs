//! CLI command implementations.

pub mod query;
pub mod schema;
