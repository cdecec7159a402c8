//! Embedding service port.
//!
//! Converts method source text into dense vectors through a remote
//! inference model.

use async_trait::async_trait;

use crate::domain::errors::EmbedError;
use crate::domain::models::Embedding;

/// Trait for embedding services used by the pipeline and search.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Service name used in log fields (e.g. "inference", "fake").
    fn name(&self) -> &'static str;

    /// Embed a batch of texts in a single request.
    ///
    /// On success the vectors are in input order. The number of vectors is
    /// returned as the service produced it; callers must check it against
    /// the number of inputs before using the result.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbedError>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Embedding, EmbedError>;
}
