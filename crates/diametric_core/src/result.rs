//! Result-row mapping.

use crate::entity::{EntityInstance, EntityTypeDescriptor};
use crate::error::{CoreError, CoreResult};
use diametric_edn::{EdnError, Value};
use std::sync::Arc;
use tracing::debug;

/// Builds an instance from one row of a query built for `descriptor`.
///
/// `row[0]` is the entity id; the following elements are the attribute
/// values in declaration order. Elements past the declared attributes
/// are ignored.
///
/// # Errors
///
/// Returns [`CoreError::MalformedResultRow`] if the row is shorter than
/// `1 + attribute count` and [`CoreError::InvalidEntityId`] if the first
/// element is not an integer.
pub fn from_row(descriptor: &Arc<EntityTypeDescriptor>, row: &[Value]) -> CoreResult<EntityInstance> {
    let expected = descriptor.len() + 1;
    if row.len() < expected {
        return Err(CoreError::MalformedResultRow {
            entity_type: descriptor.name().to_string(),
            expected,
            actual: row.len(),
        });
    }
    if row.len() > expected {
        debug!(
            entity_type = descriptor.name(),
            extra = row.len() - expected,
            "ignoring surplus result columns"
        );
    }

    let id = row[0].as_integer().ok_or_else(|| CoreError::InvalidEntityId {
        kind: row[0].kind().to_string(),
    })?;

    let mut instance = EntityInstance::new(Arc::clone(descriptor));
    for (name, value) in descriptor.attribute_names().zip(&row[1..]) {
        instance.set(name, value.clone())?;
    }
    instance.set_persisted_id(id)?;
    Ok(instance)
}

/// Maps every row of a result set.
///
/// # Errors
///
/// Fails on the first row [`from_row`] rejects.
pub fn from_rows<'a, I>(descriptor: &Arc<EntityTypeDescriptor>, rows: I) -> CoreResult<Vec<EntityInstance>>
where
    I: IntoIterator<Item = &'a [Value]>,
{
    rows.into_iter().map(|row| from_row(descriptor, row)).collect()
}

/// Unpacks a decoded result set (a vector, list or set of row vectors).
///
/// # Errors
///
/// Returns an [`EdnError::UnexpectedShape`] wrapped in [`CoreError::Edn`]
/// if the value or one of its rows is not a sequence.
pub fn rows_from_value(value: &Value) -> CoreResult<Vec<&[Value]>> {
    let rows = value
        .as_seq()
        .ok_or_else(|| EdnError::unexpected_shape("collection of rows", value.kind()))?;
    rows.iter()
        .map(|row| {
            row.as_seq()
                .ok_or_else(|| CoreError::from(EdnError::unexpected_shape("row vector", row.kind())))
        })
        .collect()
}
