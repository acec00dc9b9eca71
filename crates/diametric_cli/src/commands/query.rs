//! Query command implementation.

use crate::definition::Definition;
use diametric_edn::{from_edn, ToEdn, Value};
use std::path::Path;
use tracing::info;

/// Runs the query command.
pub fn run(path: &Path, entity: &str, filters: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    info!("Building query for {} from {:?}", entity, path);

    let mapper = Definition::load(path)?.into_mapper()?;
    let descriptor = mapper.entity_type(entity)?;
    let filters = filters
        .iter()
        .map(|f| parse_filter(f))
        .collect::<Result<Vec<_>, _>>()?;

    let request = mapper.query(descriptor, filters)?;
    println!("{}", request.query.to_edn_string()?);
    println!("{}", request.args_edn().to_edn_string()?);
    Ok(())
}

/// Splits `key=value`. The value is read as EDN when it is a literal
/// (number, string, keyword, ...); anything else is taken as plain text.
fn parse_filter(filter: &str) -> Result<(String, Value), String> {
    let (key, raw) = filter
        .split_once('=')
        .ok_or_else(|| format!("filter {filter:?} is not key=value"))?;
    if key.is_empty() {
        return Err(format!("filter {filter:?} has an empty key"));
    }
    let value = match from_edn(raw) {
        Ok(Value::Symbol(_)) | Err(_) => Value::Text(raw.to_string()),
        Ok(value) => value,
    };
    Ok((key.to_string(), value))
}
