//! Embedding service adapters.

pub mod inference;

pub use inference::{InferenceEmbeddingService, TOKEN_LIMIT_MARKER};
