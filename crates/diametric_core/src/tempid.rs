//! Temporary entity identifiers.

use crate::config::DEFAULT_TEMP_ID_SEED;
use diametric_edn::{EdnError, EdnResult, FromEdn, Keyword, ToEdn, Value};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::trace;

/// EDN tag the store recognises as "resolve this id on commit".
pub const TEMP_ID_TAG: &str = "db/id";

/// Placeholder id for an entity the store has not seen yet.
///
/// Renders as `#db/id [:partition reference]`. Schema attributes use the
/// form without a reference, `#db/id [:db.part/db]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TempId {
    partition: Keyword,
    reference: Option<i64>,
}

impl TempId {
    /// Creates a numbered temporary id.
    pub fn new(partition: Keyword, reference: i64) -> Self {
        Self {
            partition,
            reference: Some(reference),
        }
    }

    /// Creates a temporary id the store numbers itself.
    pub fn unnumbered(partition: Keyword) -> Self {
        Self {
            partition,
            reference: None,
        }
    }

    /// Returns the partition.
    pub fn partition(&self) -> &Keyword {
        &self.partition
    }

    /// Returns the negative reference, if numbered.
    pub fn reference(&self) -> Option<i64> {
        self.reference
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reference {
            Some(r) => write!(f, "#{TEMP_ID_TAG} [{} {r}]", self.partition),
            None => write!(f, "#{TEMP_ID_TAG} [{}]", self.partition),
        }
    }
}

impl ToEdn for TempId {
    fn to_edn(&self) -> Value {
        let mut parts = vec![Value::Keyword(self.partition.clone())];
        if let Some(r) = self.reference {
            parts.push(Value::Integer(r));
        }
        Value::tagged(TEMP_ID_TAG, Value::Vector(parts))
    }
}

impl FromEdn for TempId {
    fn from_edn(value: &Value) -> EdnResult<Self> {
        let parts = match value.as_tagged() {
            Some((TEMP_ID_TAG, inner)) => inner.as_seq(),
            _ => None,
        }
        .ok_or_else(|| EdnError::unexpected_shape("#db/id [...]", value.kind()))?;

        match parts {
            [Value::Keyword(partition)] => Ok(Self::unnumbered(partition.clone())),
            [Value::Keyword(partition), Value::Integer(r)] => Ok(Self::new(partition.clone(), *r)),
            _ => Err(EdnError::unexpected_shape(
                "[partition] or [partition reference]",
                format!("{} elements", parts.len()),
            )),
        }
    }
}

/// Hands out strictly decreasing negative references.
///
/// The counter is the only shared mutable state in the mapper. Share one
/// allocator per store connection through `Arc`; every allocation is a
/// single atomic decrement, so concurrent callers never see the same
/// reference.
#[derive(Debug)]
pub struct TempIdAllocator {
    counter: AtomicI64,
}

impl TempIdAllocator {
    /// Creates an allocator whose first reference is `seed - 1`.
    pub fn new(seed: i64) -> Self {
        Self {
            counter: AtomicI64::new(seed),
        }
    }

    /// Decrements the counter and returns the new value.
    pub fn next_ref(&self) -> i64 {
        let reference = self.counter.fetch_sub(1, Ordering::SeqCst) - 1;
        trace!(reference, "allocated temporary reference");
        reference
    }

    /// Allocates a numbered temporary id in `partition`.
    pub fn allocate(&self, partition: &Keyword) -> TempId {
        TempId::new(partition.clone(), self.next_ref())
    }

    /// Returns the most recently handed out reference (the seed before
    /// any allocation).
    pub fn current(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Default for TempIdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_TEMP_ID_SEED)
    }
}
