//! Transaction assembly.

use crate::entity::{EntityInstance, EntityRef};
use crate::error::CoreResult;
use crate::namespace::qualify;
use crate::tempid::TempIdAllocator;
use diametric_edn::{Keyword, ToEdn, Value};
use std::sync::Arc;
use tracing::debug;

/// Assertions about one entity: `{:db/id ..., :prefix/attr value, ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAssertion {
    id: EntityRef,
    attributes: Vec<(Keyword, Value)>,
}

impl EntityAssertion {
    /// The entity being asserted about.
    pub fn id(&self) -> &EntityRef {
        &self.id
    }

    /// Qualified attribute assertions in declaration order.
    pub fn attributes(&self) -> &[(Keyword, Value)] {
        &self.attributes
    }

    /// Looks up the asserted value of a qualified attribute.
    pub fn get(&self, ident: &Keyword) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(k, _)| k == ident)
            .map(|(_, v)| v)
    }
}

impl ToEdn for EntityAssertion {
    fn to_edn(&self) -> Value {
        let mut pairs = Vec::with_capacity(self.attributes.len() + 1);
        pairs.push((Value::Keyword(qualify("db", "id")), self.id.to_edn()));
        pairs.extend(
            self.attributes
                .iter()
                .map(|(k, v)| (Value::Keyword(k.clone()), v.clone())),
        );
        Value::Map(pairs)
    }
}

/// Transaction data: a sequence holding one entity map.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    entities: Vec<EntityAssertion>,
}

impl Transaction {
    /// Entity maps in the transaction.
    pub fn entities(&self) -> &[EntityAssertion] {
        &self.entities
    }

    /// The first (and, when built from an instance, only) entity map.
    pub fn entity(&self) -> Option<&EntityAssertion> {
        self.entities.first()
    }
}

impl ToEdn for Transaction {
    fn to_edn(&self) -> Value {
        Value::Vector(self.entities.iter().map(ToEdn::to_edn).collect())
    }
}

/// Turns live instances into transaction data.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    allocator: Arc<TempIdAllocator>,
}

impl TransactionBuilder {
    /// Creates a builder drawing temporary ids from `allocator`.
    pub fn new(allocator: Arc<TempIdAllocator>) -> Self {
        Self { allocator }
    }

    /// Asserts every declared attribute of `instance`.
    ///
    /// # Errors
    ///
    /// Infallible for declared names; the signature matches
    /// [`build_subset`](Self::build_subset).
    pub fn build(&self, instance: &EntityInstance) -> CoreResult<Transaction> {
        let names: Vec<&str> = instance.descriptor().attribute_names().collect();
        self.build_subset(instance, &names)
    }

    /// Asserts the named attributes of `instance`.
    ///
    /// The entity is identified by its persisted id when it has one,
    /// otherwise by its cached temporary id. Every named attribute is
    /// asserted; one without a value is asserted as `nil`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownAttribute`](crate::CoreError::UnknownAttribute)
    /// for a name the type does not declare.
    pub fn build_subset(&self, instance: &EntityInstance, names: &[&str]) -> CoreResult<Transaction> {
        let descriptor = instance.descriptor();
        let mut attributes = Vec::with_capacity(names.len());
        for name in names {
            let position = descriptor.require(name)?;
            let value = instance.value_at(position).cloned().unwrap_or(Value::Nil);
            attributes.push((descriptor.ident(name), value));
        }

        let id = instance.entity_ref(&self.allocator);
        debug!(
            entity_type = descriptor.name(),
            id = %id,
            attributes = attributes.len(),
            "built transaction"
        );

        Ok(Transaction {
            entities: vec![EntityAssertion { id, attributes }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AttributeOptions, EntityTypeDescriptor, SemanticType};
    use crate::error::CoreError;

    fn person() -> Arc<EntityTypeDescriptor> {
        Arc::new(
            EntityTypeDescriptor::builder("Person")
                .prefix("p")
                .attribute("name", SemanticType::String, AttributeOptions::new())
                .attribute("age", SemanticType::Long, AttributeOptions::new())
                .build()
                .unwrap(),
        )
    }

    fn ann() -> EntityInstance {
        EntityInstance::with_values(
            person(),
            [("name", Value::from("Ann")), ("age", Value::Integer(30))],
        )
        .unwrap()
    }

    #[test]
    fn new_instance_gets_stable_temp_id() {
        let builder = TransactionBuilder::new(Arc::new(TempIdAllocator::default()));
        let ann = ann();

        let first = builder.build(&ann).unwrap();
        let second = builder.build(&ann).unwrap();
        assert_eq!(first.entity().unwrap().id(), second.entity().unwrap().id());
        assert_eq!(
            first.to_edn_string().unwrap(),
            "[{:db/id #db/id [:db.part/db -1001], :p/name \"Ann\", :p/age 30}]"
        );
    }

    #[test]
    fn persisted_instance_skips_allocator() {
        let allocator = Arc::new(TempIdAllocator::default());
        let builder = TransactionBuilder::new(Arc::clone(&allocator));
        let mut ann = ann();
        ann.set_persisted_id(42).unwrap();

        let tx = builder.build(&ann).unwrap();
        assert_eq!(tx.entities().len(), 1);
        assert_eq!(tx.entity().unwrap().id(), &EntityRef::Persisted(42));
        assert_eq!(allocator.current(), -1000);
        assert_eq!(ann.cached_temp_id(), None);
    }

    #[test]
    fn subset_and_unset_attributes() {
        let builder = TransactionBuilder::new(Arc::new(TempIdAllocator::default()));
        let mut ann = ann();
        ann.set_persisted_id(7).unwrap();

        let tx = builder.build_subset(&ann, &["age"]).unwrap();
        let entity = tx.entity().unwrap();
        assert_eq!(entity.attributes().len(), 1);
        assert_eq!(
            entity.get(&Keyword::namespaced("p", "age")),
            Some(&Value::Integer(30))
        );

        ann.unset("name").unwrap();
        let tx = builder.build(&ann).unwrap();
        assert_eq!(tx.to_edn_string().unwrap(), "[{:db/id 7, :p/name nil, :p/age 30}]");
    }

    #[test]
    fn unset_attribute_is_asserted_as_nil() {
        let builder = TransactionBuilder::new(Arc::new(TempIdAllocator::default()));
        let ann = EntityInstance::with_values(person(), [("name", "Ann")]).unwrap();

        let tx = builder.build(&ann).unwrap();
        let entity = tx.entity().unwrap();
        assert_eq!(entity.attributes().len(), 2);
        assert_eq!(entity.get(&Keyword::namespaced("p", "age")), Some(&Value::Nil));
        assert_eq!(
            tx.to_edn_string().unwrap(),
            "[{:db/id #db/id [:db.part/db -1001], :p/name \"Ann\", :p/age nil}]"
        );

        let tx = builder.build_subset(&ann, &["age"]).unwrap();
        assert_eq!(
            tx.to_edn_string().unwrap(),
            "[{:db/id #db/id [:db.part/db -1001], :p/age nil}]"
        );
    }

    #[test]
    fn subset_rejects_undeclared_names() {
        let builder = TransactionBuilder::new(Arc::new(TempIdAllocator::default()));
        assert_eq!(
            builder.build_subset(&ann(), &["email"]),
            Err(CoreError::unknown_attribute("Person", "email"))
        );
    }
}
