//! Adapters connecting the domain ports to external systems.

pub mod embeddings;
pub mod memory;
pub mod neo4j;
