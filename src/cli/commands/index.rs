use anyhow::{bail, Result};

use crate::domain::models::Config;
use crate::services::IndexMaintenance;

/// Handle the index command: drop and recreate the vector index
pub async fn execute(config: &Config, json: bool) -> Result<()> {
    let store = super::connect_store(config).await?;
    let maintenance =
        IndexMaintenance::new(store, config.index_spec(), config.pipeline.failure_policy);
    let index = maintenance.index();

    if !maintenance.rebuild().await? {
        bail!("Failed to rebuild vector index '{}'", index.name);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(index)?);
    } else {
        println!(
            "Rebuilt vector index '{}' on :{}({}) with {} dimensions ({})",
            index.name, index.label, index.property, index.dimensions, index.similarity
        );
    }

    Ok(())
}
