//! Mapper facade.

use crate::config::Config;
use crate::entity::{EntityInstance, EntityTypeBuilder, EntityTypeDescriptor};
use crate::error::{CoreError, CoreResult};
use crate::query::{QueryBuilder, QueryRequest};
use crate::result;
use crate::schema::{SchemaCompiler, SchemaRecord};
use crate::tempid::TempIdAllocator;
use crate::transaction::{Transaction, TransactionBuilder};
use diametric_edn::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of entity types plus the builders that work on them.
///
/// One mapper owns one temporary id allocator, so every instance created
/// through it draws from the same counter.
///
/// # Example
///
/// ```
/// use diametric_core::{AttributeOptions, Mapper, SemanticType};
/// use diametric_edn::ToEdn;
///
/// let mut mapper = Mapper::default();
/// let person = mapper
///     .register(
///         mapper
///             .define("Person")
///             .attribute("name", SemanticType::String, AttributeOptions::new()),
///     )
///     .unwrap();
///
/// let mut ann = mapper.instance(&person);
/// ann.set("name", "Ann").unwrap();
/// let tx = mapper.transaction(&ann).unwrap();
/// assert_eq!(
///     tx.to_edn_string().unwrap(),
///     "[{:db/id #db/id [:db.part/db -1001], :person/name \"Ann\"}]"
/// );
/// ```
#[derive(Debug)]
pub struct Mapper {
    config: Config,
    allocator: Arc<TempIdAllocator>,
    schema: SchemaCompiler,
    queries: QueryBuilder,
    transactions: TransactionBuilder,
    types: Vec<Arc<EntityTypeDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl Mapper {
    /// Creates a mapper with its own allocator.
    pub fn new(config: Config) -> Self {
        let allocator = Arc::new(TempIdAllocator::new(config.temp_id_seed));
        Self::with_allocator(config, allocator)
    }

    /// Creates a mapper sharing an existing allocator.
    pub fn with_allocator(config: Config, allocator: Arc<TempIdAllocator>) -> Self {
        Self {
            schema: SchemaCompiler::new(config.schema_partition.clone()),
            queries: QueryBuilder::new(config.filter_policy),
            transactions: TransactionBuilder::new(Arc::clone(&allocator)),
            allocator,
            config,
            types: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared temporary id allocator.
    pub fn allocator(&self) -> &Arc<TempIdAllocator> {
        &self.allocator
    }

    /// Starts defining an entity type in the configured default partition.
    pub fn define(&self, name: impl Into<String>) -> EntityTypeBuilder {
        EntityTypeBuilder::new(name).partition_keyword(self.config.default_partition.clone())
    }

    /// Finishes a definition and registers the type.
    ///
    /// # Errors
    ///
    /// Returns the builder's error, or [`CoreError::DuplicateEntityType`]
    /// if the name is already registered.
    pub fn register(&mut self, builder: EntityTypeBuilder) -> CoreResult<Arc<EntityTypeDescriptor>> {
        if self.by_name.contains_key(builder.name()) {
            return Err(CoreError::DuplicateEntityType {
                name: builder.name().to_string(),
            });
        }
        let descriptor = Arc::new(builder.build()?);
        self.by_name
            .insert(descriptor.name().to_string(), self.types.len());
        self.types.push(Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Looks up a registered type.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownEntityType`] for an unregistered name.
    pub fn entity_type(&self, name: &str) -> CoreResult<&Arc<EntityTypeDescriptor>> {
        self.by_name
            .get(name)
            .map(|&i| &self.types[i])
            .ok_or_else(|| CoreError::UnknownEntityType {
                name: name.to_string(),
            })
    }

    /// Registered types in registration order.
    pub fn entity_types(&self) -> &[Arc<EntityTypeDescriptor>] {
        &self.types
    }

    /// Schema records for every registered type, in registration order.
    ///
    /// # Errors
    ///
    /// Fails on the first attribute the compiler rejects.
    pub fn schema(&self) -> CoreResult<Vec<SchemaRecord>> {
        let mut records = Vec::new();
        for descriptor in &self.types {
            records.extend(self.schema.compile(descriptor)?);
        }
        Ok(records)
    }

    /// Schema records for one type.
    ///
    /// # Errors
    ///
    /// See [`SchemaCompiler::compile`].
    pub fn schema_for(&self, descriptor: &EntityTypeDescriptor) -> CoreResult<Vec<SchemaRecord>> {
        self.schema.compile(descriptor)
    }

    /// Query fetching entities of a type by filter.
    ///
    /// # Errors
    ///
    /// See [`QueryBuilder::build`].
    pub fn query<I, K, V>(&self, descriptor: &EntityTypeDescriptor, filters: I) -> CoreResult<QueryRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.queries.build(descriptor, filters)
    }

    /// A fresh, unpersisted instance.
    pub fn instance(&self, descriptor: &Arc<EntityTypeDescriptor>) -> EntityInstance {
        EntityInstance::new(Arc::clone(descriptor))
    }

    /// Instance from one result row.
    ///
    /// # Errors
    ///
    /// See [`result::from_row`].
    pub fn from_row(&self, descriptor: &Arc<EntityTypeDescriptor>, row: &[Value]) -> CoreResult<EntityInstance> {
        result::from_row(descriptor, row)
    }

    /// Transaction asserting every attribute of `instance`.
    ///
    /// # Errors
    ///
    /// See [`TransactionBuilder::build`].
    pub fn transaction(&self, instance: &EntityInstance) -> CoreResult<Transaction> {
        self.transactions.build(instance)
    }

    /// Transaction asserting the named attributes of `instance`.
    ///
    /// # Errors
    ///
    /// See [`TransactionBuilder::build_subset`].
    pub fn transaction_subset(&self, instance: &EntityInstance, names: &[&str]) -> CoreResult<Transaction> {
        self.transactions.build_subset(instance, names)
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AttributeOptions, SemanticType};
    use crate::FilterPolicy;

    #[test]
    fn register_and_lookup() {
        let mut mapper = Mapper::default();
        let person = mapper.register(mapper.define("Person")).unwrap();
        assert_eq!(mapper.entity_type("Person").unwrap(), &person);
        assert_eq!(
            mapper.entity_type("Order").unwrap_err(),
            CoreError::UnknownEntityType {
                name: "Order".into()
            }
        );
        assert_eq!(
            mapper.register(mapper.define("Person")).unwrap_err(),
            CoreError::DuplicateEntityType {
                name: "Person".into()
            }
        );
    }

    #[test]
    fn define_uses_configured_partition() {
        let mut mapper = Mapper::new(Config::new().default_partition("db.part/user"));
        let person = mapper.register(mapper.define("Person")).unwrap();
        assert_eq!(person.partition().to_string(), ":db.part/user");
    }

    #[test]
    fn schema_covers_all_types_in_order() {
        let mut mapper = Mapper::default();
        mapper
            .register(
                mapper
                    .define("Person")
                    .attribute("name", SemanticType::String, AttributeOptions::new()),
            )
            .unwrap();
        mapper
            .register(
                mapper
                    .define("Order")
                    .attribute("total", SemanticType::BigDec, AttributeOptions::new())
                    .attribute("customer", "ref", AttributeOptions::new()),
            )
            .unwrap();

        let idents: Vec<String> = mapper
            .schema()
            .unwrap()
            .iter()
            .filter_map(|r| r.ident().map(ToString::to_string))
            .collect();
        assert_eq!(idents, vec![":person/name", ":order/total", ":order/customer"]);
    }

    #[test]
    fn shared_allocator_across_mappers() {
        let allocator = Arc::new(TempIdAllocator::default());
        let mut a = Mapper::with_allocator(Config::default(), Arc::clone(&allocator));
        let mut b = Mapper::with_allocator(Config::default(), Arc::clone(&allocator));
        let x = a.register(a.define("X")).unwrap();
        let y = b.register(b.define("Y")).unwrap();

        let tx_x = a.transaction(&a.instance(&x)).unwrap();
        let tx_y = b.transaction(&b.instance(&y)).unwrap();
        assert_ne!(tx_x.entity().unwrap().id(), tx_y.entity().unwrap().id());
        assert_eq!(allocator.current(), -1002);
    }

    #[test]
    fn query_uses_configured_policy() {
        let mut mapper = Mapper::new(Config::new().filter_policy(FilterPolicy::Reject));
        let person = mapper.register(mapper.define("Person")).unwrap();
        assert!(mapper.query(&person, [("email", "x@y.com")]).is_err());
    }
}
