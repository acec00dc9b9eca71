//! Entity types, their attribute declarations, and live instances.

mod attribute;
mod descriptor;
mod instance;

pub use attribute::{
    AttributeDeclaration, AttributeOptions, Cardinality, SemanticType, SemanticTyped, Unique,
    ValueType, CARDINALITY, UNIQUE,
};
pub use descriptor::{EntityTypeBuilder, EntityTypeDescriptor};
pub use instance::{EntityInstance, EntityRef};
