//! Similarity search over the method vector index.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::errors::{DomainError, DomainResult, EmbedError};
use crate::domain::models::SimilarMethod;
use crate::domain::ports::{EmbeddingService, GraphStore};

/// Finds the methods closest to a free-text query.
pub struct SimilaritySearch {
    store: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingService>,
    index_name: String,
}

impl SimilaritySearch {
    pub fn new(
        store: Arc<dyn GraphStore>,
        embedder: Arc<dyn EmbeddingService>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            embedder,
            index_name: index_name.into(),
        }
    }

    /// Up to `top_n` methods ordered by descending similarity
    #[instrument(skip(self, query), fields(index = %self.index_name))]
    pub async fn search(&self, query: &str, top_n: usize) -> DomainResult<Vec<SimilarMethod>> {
        if query.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "search query must not be empty".to_string(),
            ));
        }
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed_query(query).await?;
        if embedding.is_empty() {
            return Err(EmbedError::Decode("query embedding is empty".to_string()).into());
        }

        let mut matches = self
            .store
            .query_similar(&self.index_name, top_n, &embedding)
            .await?;
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(top_n);

        debug!(matches = matches.len(), "similarity search finished");
        Ok(matches)
    }
}
