//! Entity type descriptors and the registration builder.

use crate::config::db_partition;
use crate::entity::attribute::{AttributeDeclaration, AttributeOptions, ValueType};
use crate::error::{CoreError, CoreResult};
use crate::namespace::{prefix_for, qualify};
use crate::query::ENTITY_VAR;
use diametric_edn::Keyword;
use std::collections::HashMap;
use tracing::debug;

/// Immutable description of an entity type.
///
/// Declaration order is significant: it fixes the order of query
/// variables and of result-row columns.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTypeDescriptor {
    name: String,
    prefix: String,
    partition: Keyword,
    attributes: Vec<AttributeDeclaration>,
    index: HashMap<String, usize>,
}

impl EntityTypeDescriptor {
    /// Starts registering an entity type.
    pub fn builder(name: impl Into<String>) -> EntityTypeBuilder {
        EntityTypeBuilder::new(name)
    }

    /// Type name as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace every attribute ident is qualified with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Partition new entities of this type are minted in.
    pub fn partition(&self) -> &Keyword {
        &self.partition
    }

    /// Declarations in registration order.
    pub fn declarations(&self) -> &[AttributeDeclaration] {
        &self.attributes
    }

    /// Attribute names in registration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(AttributeDeclaration::name)
    }

    /// Number of declared attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// True when the type declares no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Position of an attribute in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Looks up a declaration by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDeclaration> {
        self.position(name).map(|i| &self.attributes[i])
    }

    /// True if `name` is a declared attribute.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Qualified ident of an attribute, `prefix/name`.
    pub fn ident(&self, name: &str) -> Keyword {
        qualify(&self.prefix, name)
    }

    /// Position of `name`, or an [`CoreError::UnknownAttribute`].
    pub(crate) fn require(&self, name: &str) -> CoreResult<usize> {
        self.position(name)
            .ok_or_else(|| CoreError::unknown_attribute(&self.name, name))
    }
}

/// Registers the attributes of one entity type.
///
/// Chained [`attribute`](Self::attribute) calls defer a duplicate-name
/// error to [`build`](Self::build); [`register`](Self::register) reports
/// it immediately.
#[derive(Debug, Clone)]
pub struct EntityTypeBuilder {
    name: String,
    prefix: String,
    partition: Keyword,
    attributes: Vec<AttributeDeclaration>,
    index: HashMap<String, usize>,
    error: Option<CoreError>,
}

impl EntityTypeBuilder {
    /// Creates a builder with the prefix derived from `name` and the
    /// store's default partition.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            prefix: prefix_for(&name),
            name,
            partition: db_partition(),
            attributes: Vec::new(),
            index: HashMap::new(),
            error: None,
        }
    }

    /// Overrides the derived prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the partition, e.g. `db.part/user`.
    #[must_use]
    pub fn partition(mut self, partition: &str) -> Self {
        self.partition = Keyword::parse(partition);
        self
    }

    pub(crate) fn partition_keyword(mut self, partition: Keyword) -> Self {
        self.partition = partition;
        self
    }

    /// Type name being registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declarations registered so far.
    pub fn declarations(&self) -> &[AttributeDeclaration] {
        &self.attributes
    }

    /// Appends a declaration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateAttribute`] if the name is taken and
    /// [`CoreError::ReservedName`] for the entity variable's name.
    pub fn register(&mut self, declaration: AttributeDeclaration) -> CoreResult<&mut Self> {
        if declaration.name() == ENTITY_VAR {
            return Err(CoreError::ReservedName {
                entity_type: self.name.clone(),
                name: declaration.name().to_string(),
            });
        }
        if self.index.contains_key(declaration.name()) {
            return Err(CoreError::DuplicateAttribute {
                entity_type: self.name.clone(),
                attribute: declaration.name().to_string(),
            });
        }
        self.index
            .insert(declaration.name().to_string(), self.attributes.len());
        self.attributes.push(declaration);
        Ok(self)
    }

    /// Declares an attribute, chaining.
    #[must_use]
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        value_type: impl Into<ValueType>,
        options: AttributeOptions,
    ) -> Self {
        let declaration = AttributeDeclaration::new(name, value_type, options);
        if self.error.is_none() {
            self.error = self.register(declaration).err();
        }
        self
    }

    /// Finishes registration.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by a chained
    /// [`attribute`](Self::attribute) call.
    pub fn build(self) -> CoreResult<EntityTypeDescriptor> {
        if let Some(e) = self.error {
            return Err(e);
        }
        debug!(
            entity_type = %self.name,
            prefix = %self.prefix,
            attributes = self.attributes.len(),
            "registered entity type"
        );
        Ok(EntityTypeDescriptor {
            name: self.name,
            prefix: self.prefix,
            partition: self.partition,
            attributes: self.attributes,
            index: self.index,
        })
    }
}
