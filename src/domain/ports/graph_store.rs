//! Graph store port.
//!
//! Narrow interface over the graph database holding method records and the
//! vector index built on their embeddings.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Embedding, MethodRecord, RecordId, RecordScope, SimilarMethod, VectorIndexSpec,
};

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Number of records matching `scope`.
    async fn count_records(&self, scope: RecordScope) -> DomainResult<u64>;

    /// Up to `limit` records matching `scope`, skipping the first `offset`.
    ///
    /// Records are ordered by their internal identifier so that repeated
    /// scans over an unmodified store enumerate every record exactly once.
    async fn fetch_page(
        &self,
        scope: RecordScope,
        offset: u64,
        limit: usize,
    ) -> DomainResult<Vec<MethodRecord>>;

    /// Set the embedding of every listed record, atomically for the batch.
    ///
    /// Returns the number of records updated.
    async fn write_embeddings(&self, batch: &[(RecordId, Embedding)]) -> DomainResult<usize>;

    /// Drop the named index. A missing index is not an error.
    async fn drop_index_if_exists(&self, name: &str) -> DomainResult<()>;

    /// Create the vector index described by `spec`.
    async fn create_vector_index(&self, spec: &VectorIndexSpec) -> DomainResult<()>;

    /// The `k` records closest to `embedding` according to the named index.
    async fn query_similar(
        &self,
        index_name: &str,
        k: usize,
        embedding: &[f32],
    ) -> DomainResult<Vec<SimilarMethod>>;
}
