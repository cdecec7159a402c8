//! Application services built on the domain ports.

pub mod embedding_pipeline;
pub mod index_maintenance;
pub mod search_service;

pub use embedding_pipeline::{EmbeddingPipeline, PipelineSettings};
pub use index_maintenance::IndexMaintenance;
pub use search_service::SimilaritySearch;
