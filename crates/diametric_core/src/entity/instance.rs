//! Entity instances.

use crate::entity::descriptor::EntityTypeDescriptor;
use crate::error::{CoreError, CoreResult};
use crate::tempid::{TempId, TempIdAllocator};
use diametric_edn::{ToEdn, Value};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Identity of an entity in a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// Id assigned by the store.
    Persisted(i64),
    /// Placeholder resolved by the store on commit.
    Temp(TempId),
}

impl ToEdn for EntityRef {
    fn to_edn(&self) -> Value {
        match self {
            EntityRef::Persisted(id) => Value::Integer(*id),
            EntityRef::Temp(temp) => temp.to_edn(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Persisted(id) => write!(f, "{id}"),
            EntityRef::Temp(temp) => write!(f, "{temp}"),
        }
    }
}

/// A live entity: attribute values plus its identity.
///
/// Values are stored by declaration position, so reading or writing an
/// attribute is a lookup in the descriptor's name index. The temporary
/// id is assigned on first request and then kept for the lifetime of
/// the instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInstance {
    descriptor: Arc<EntityTypeDescriptor>,
    values: Vec<Option<Value>>,
    persisted_id: Option<i64>,
    temp_id: OnceLock<TempId>,
}

impl EntityInstance {
    /// Creates an instance with every attribute unset.
    pub fn new(descriptor: Arc<EntityTypeDescriptor>) -> Self {
        let values = vec![None; descriptor.len()];
        Self {
            descriptor,
            values,
            persisted_id: None,
            temp_id: OnceLock::new(),
        }
    }

    /// Creates an instance and assigns the given attributes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownAttribute`] for a name the type does
    /// not declare.
    pub fn with_values<I, K, V>(descriptor: Arc<EntityTypeDescriptor>, values: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut instance = Self::new(descriptor);
        for (name, value) in values {
            instance.set(name.as_ref(), value)?;
        }
        Ok(instance)
    }

    /// The instance's entity type.
    pub fn descriptor(&self) -> &Arc<EntityTypeDescriptor> {
        &self.descriptor
    }

    /// Current value of an attribute; `None` if unset or undeclared.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.descriptor
            .position(name)
            .and_then(|i| self.values[i].as_ref())
    }

    /// Assigns an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownAttribute`] if `name` is not declared.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> CoreResult<()> {
        let i = self.descriptor.require(name)?;
        self.values[i] = Some(value.into());
        Ok(())
    }

    /// Clears an attribute, returning its previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownAttribute`] if `name` is not declared.
    pub fn unset(&mut self, name: &str) -> CoreResult<Option<Value>> {
        let i = self.descriptor.require(name)?;
        Ok(self.values[i].take())
    }

    /// Attribute names paired with their values, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.descriptor
            .attribute_names()
            .zip(self.values.iter().map(Option::as_ref))
    }

    pub(crate) fn value_at(&self, position: usize) -> Option<&Value> {
        self.values[position].as_ref()
    }

    /// Id the store assigned, once written back.
    pub fn persisted_id(&self) -> Option<i64> {
        self.persisted_id
    }

    /// Records the id the store assigned.
    ///
    /// Assigning the same id again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyPersisted`] if a different id is set.
    pub fn set_persisted_id(&mut self, id: i64) -> CoreResult<()> {
        match self.persisted_id {
            Some(existing) if existing != id => Err(CoreError::AlreadyPersisted {
                existing,
                requested: id,
            }),
            _ => {
                self.persisted_id = Some(id);
                Ok(())
            }
        }
    }

    /// True once the store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.persisted_id.is_some()
    }

    /// True until the store has assigned an id.
    pub fn is_new_record(&self) -> bool {
        !self.is_persisted()
    }

    /// Key parts identifying the instance, if persisted.
    pub fn to_key(&self) -> Option<Vec<i64>> {
        self.persisted_id.map(|id| vec![id])
    }

    /// Temporary id, allocated from `allocator` on first call.
    pub fn temp_id(&self, allocator: &TempIdAllocator) -> &TempId {
        self.temp_id
            .get_or_init(|| allocator.allocate(self.descriptor.partition()))
    }

    /// Temporary id, if one was already allocated.
    pub fn cached_temp_id(&self) -> Option<&TempId> {
        self.temp_id.get()
    }

    /// Transaction identity: the persisted id when known, otherwise the
    /// temporary id.
    pub fn entity_ref(&self, allocator: &TempIdAllocator) -> EntityRef {
        match self.persisted_id {
            Some(id) => EntityRef::Persisted(id),
            None => EntityRef::Temp(self.temp_id(allocator).clone()),
        }
    }
}
