//! Schema command implementation.

use crate::definition::Definition;
use diametric_core::schema_to_edn;
use diametric_edn::to_edn_string;
use std::path::Path;
use tracing::info;

/// Runs the schema command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Compiling schema from {:?}", path);

    let mapper = Definition::load(path)?.into_mapper()?;
    let records = mapper.schema()?;
    info!(
        "{} attributes across {} entity types",
        records.len(),
        mapper.entity_types().len()
    );

    println!("{}", to_edn_string(&schema_to_edn(&records))?);
    Ok(())
}
