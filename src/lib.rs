//! codembed - embeddings for code methods stored in Neo4j
//!
//! Reads method source text from a graph database, turns it into dense
//! vectors through a remote inference endpoint, writes the vectors back and
//! maintains the vector index used for similarity search.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the ports the services depend on
//! - **Service Layer** (`services`): the embedding pipeline and similarity search
//! - **Adapters** (`adapters`): Neo4j, in-memory and inference implementations of the ports
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, HTTP and tokenizers
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use codembed::adapters::memory::InMemoryGraphStore;
//! use codembed::services::{EmbeddingPipeline, PipelineSettings};
//!
//! let pipeline = EmbeddingPipeline::new(store, embedder, PipelineSettings::from_config(&config));
//! let report = pipeline.run(&codembed::domain::ports::NullProgress).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult, EmbedError};
pub use domain::models::{
    Config, Embedding, FailurePolicy, MethodRecord, RecordId, RecordScope, RunReport,
    SimilarMethod, VectorIndexSpec,
};
pub use domain::ports::{EmbeddingService, GraphStore, ProgressSink, Tokenizer};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{EmbeddingPipeline, IndexMaintenance, PipelineSettings, SimilaritySearch};
