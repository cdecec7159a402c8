//! Command handlers
//!
//! Each handler builds its collaborators from the loaded configuration and
//! hands them to the services as trait objects.

pub mod embed;
pub mod index;
pub mod search;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::embeddings::InferenceEmbeddingService;
use crate::adapters::neo4j::Neo4jGraphStore;
use crate::domain::models::Config;
use crate::domain::ports::{EmbeddingService, GraphStore};
use crate::infrastructure::tokenizer;

/// Connect to the configured graph database
pub async fn connect_store(config: &Config) -> Result<Arc<dyn GraphStore>> {
    let store = Neo4jGraphStore::connect(&config.graph)
        .await
        .context("Failed to connect to Neo4j")?;
    Ok(Arc::new(store))
}

/// Build the inference-backed embedding service with its tokenizer
pub fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingService>> {
    let tokenizer = tokenizer::from_config(&config.tokenizer).context("Failed to load tokenizer")?;
    let service = InferenceEmbeddingService::from_config(config, tokenizer)
        .context("Failed to build inference client")?;
    Ok(Arc::new(service))
}
