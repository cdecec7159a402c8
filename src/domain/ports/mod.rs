//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces that infrastructure adapters implement:
//! - GraphStore: record paging, embedding writes, vector index lifecycle
//! - EmbeddingService: remote text-to-vector inference
//! - Tokenizer: token counting and budget truncation
//! - ProgressSink: pipeline progress notifications

pub mod embedding;
pub mod graph_store;
pub mod progress;
pub mod tokenizer;

pub use embedding::EmbeddingService;
pub use graph_store::GraphStore;
pub use progress::{NullProgress, ProgressSink};
pub use tokenizer::{Tokenizer, Truncated};
