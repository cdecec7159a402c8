//! In-memory graph store.
//!
//! Holds method records and vector indexes in process memory with the same
//! observable behavior as the Neo4j adapter: id-ordered paging, all-or-nothing
//! batch writes, and similarity scores normalized to `[0, 1]`.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Embedding, MethodRecord, RecordId, RecordScope, SimilarMethod, SimilarityFunction,
    VectorIndexSpec,
};
use crate::domain::ports::GraphStore;

#[derive(Debug, Clone, Default)]
struct StoredMethod {
    code: Option<String>,
    embedding: Option<Embedding>,
}

impl StoredMethod {
    fn matches(&self, scope: RecordScope) -> bool {
        match scope {
            RecordScope::All => self.code.is_some(),
            RecordScope::Unembedded => self.code.is_some() && self.embedding.is_none(),
        }
    }
}

/// Injected failures for exercising error paths.
#[derive(Debug, Default)]
struct Failures {
    /// Batches containing any of these ids are rejected
    write_ids: HashSet<RecordId>,
    index_drop: bool,
    index_create: bool,
}

/// Graph store keeping everything in process memory.
#[derive(Clone, Default)]
pub struct InMemoryGraphStore {
    methods: Arc<RwLock<BTreeMap<RecordId, StoredMethod>>>,
    indexes: Arc<RwLock<HashMap<String, VectorIndexSpec>>>,
    failures: Arc<RwLock<Failures>>,
    write_calls: Arc<RwLock<usize>>,
    create_index_calls: Arc<RwLock<usize>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with methods that have source text and no embedding
    pub fn with_methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let methods = methods
            .into_iter()
            .map(|(id, code)| {
                (
                    RecordId(id),
                    StoredMethod {
                        code: Some(code.into()),
                        embedding: None,
                    },
                )
            })
            .collect();

        Self {
            methods: Arc::new(RwLock::new(methods)),
            ..Self::default()
        }
    }

    /// Insert or replace a record
    pub async fn insert(&self, id: i64, code: Option<String>, embedding: Option<Embedding>) {
        self.methods
            .write()
            .await
            .insert(RecordId(id), StoredMethod { code, embedding });
    }

    pub async fn embedding(&self, id: i64) -> Option<Embedding> {
        self.methods
            .read()
            .await
            .get(&RecordId(id))
            .and_then(|method| method.embedding.clone())
    }

    /// Ids of records that currently have an embedding, in id order
    pub async fn embedded_ids(&self) -> Vec<RecordId> {
        self.methods
            .read()
            .await
            .iter()
            .filter(|(_, method)| method.embedding.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    pub async fn indexes(&self) -> Vec<VectorIndexSpec> {
        let mut indexes: Vec<_> = self.indexes.read().await.values().cloned().collect();
        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        indexes
    }

    /// Number of `write_embeddings` calls, failed ones included
    pub async fn write_calls(&self) -> usize {
        *self.write_calls.read().await
    }

    /// Reject every batch write that contains `id`
    pub async fn fail_writes_containing(&self, id: i64) {
        self.failures.write().await.write_ids.insert(RecordId(id));
    }

    /// Number of `create_vector_index` calls, failed ones included
    pub async fn create_index_calls(&self) -> usize {
        *self.create_index_calls.read().await
    }

    pub async fn fail_index_drop(&self) {
        self.failures.write().await.index_drop = true;
    }

    pub async fn fail_index_create(&self) {
        self.failures.write().await.index_create = true;
    }
}

fn injected_ddl_failure(name: &str, step: &str) -> DomainError {
    DomainError::IndexError {
        name: name.to_string(),
        reason: format!("injected {step} failure"),
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn count_records(&self, scope: RecordScope) -> DomainResult<u64> {
        let methods = self.methods.read().await;
        Ok(methods.values().filter(|m| m.matches(scope)).count() as u64)
    }

    async fn fetch_page(
        &self,
        scope: RecordScope,
        offset: u64,
        limit: usize,
    ) -> DomainResult<Vec<MethodRecord>> {
        let skip = usize::try_from(offset)
            .map_err(|_| DomainError::ValidationFailed(format!("offset {offset} too large")))?;
        let methods = self.methods.read().await;

        Ok(methods
            .iter()
            .filter(|(_, method)| method.matches(scope))
            .skip(skip)
            .take(limit)
            .filter_map(|(id, method)| {
                method
                    .code
                    .as_ref()
                    .map(|code| MethodRecord::new(*id, code.clone()))
            })
            .collect())
    }

    async fn write_embeddings(&self, batch: &[(RecordId, Embedding)]) -> DomainResult<usize> {
        *self.write_calls.write().await += 1;

        {
            let failures = self.failures.read().await;
            if let Some((id, _)) = batch.iter().find(|(id, _)| failures.write_ids.contains(id)) {
                return Err(DomainError::DatabaseError(format!(
                    "injected write failure for record {id}"
                )));
            }
        }

        // Vectors must fit every index on the embedding property
        let indexes = self.indexes.read().await;
        for (id, embedding) in batch {
            if let Some(index) = indexes
                .values()
                .find(|index| index.dimensions != embedding.len())
            {
                return Err(DomainError::DimensionMismatch {
                    id: *id,
                    expected: index.dimensions,
                    actual: embedding.len(),
                });
            }
        }
        drop(indexes);

        let mut methods = self.methods.write().await;
        let mut written = 0;
        for (id, embedding) in batch {
            if let Some(method) = methods.get_mut(id) {
                method.embedding = Some(embedding.clone());
                written += 1;
            }
        }
        Ok(written)
    }

    async fn drop_index_if_exists(&self, name: &str) -> DomainResult<()> {
        if self.failures.read().await.index_drop {
            return Err(injected_ddl_failure(name, "drop"));
        }
        self.indexes.write().await.remove(name);
        Ok(())
    }

    async fn create_vector_index(&self, spec: &VectorIndexSpec) -> DomainResult<()> {
        *self.create_index_calls.write().await += 1;
        if self.failures.read().await.index_create {
            return Err(injected_ddl_failure(&spec.name, "create"));
        }
        self.indexes
            .write()
            .await
            .entry(spec.name.clone())
            .or_insert_with(|| spec.clone());
        Ok(())
    }

    async fn query_similar(
        &self,
        index_name: &str,
        k: usize,
        embedding: &[f32],
    ) -> DomainResult<Vec<SimilarMethod>> {
        let index = self
            .indexes
            .read()
            .await
            .get(index_name)
            .cloned()
            .ok_or_else(|| DomainError::IndexError {
                name: index_name.to_string(),
                reason: "no such index".to_string(),
            })?;

        if embedding.len() != index.dimensions {
            return Err(DomainError::ValidationFailed(format!(
                "query vector has {} dimensions, index '{}' expects {}",
                embedding.len(),
                index.name,
                index.dimensions
            )));
        }

        let methods = self.methods.read().await;
        let mut hits: Vec<SimilarMethod> = methods
            .iter()
            .filter_map(|(id, method)| {
                let stored = method.embedding.as_ref()?;
                (stored.len() == index.dimensions).then(|| SimilarMethod {
                    id: *id,
                    similarity: score(index.similarity, embedding, stored),
                    code: method.code.clone(),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

/// Index score for two vectors of equal length, higher is closer
fn score(function: SimilarityFunction, a: &[f32], b: &[f32]) -> f64 {
    match function {
        SimilarityFunction::Cosine => {
            let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
            for (x, y) in a.iter().zip(b) {
                let (x, y) = (f64::from(*x), f64::from(*y));
                dot += x * y;
                norm_a += x * x;
                norm_b += y * y;
            }
            if norm_a == 0.0 || norm_b == 0.0 {
                return 0.0;
            }
            let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
            (1.0 + cosine) / 2.0
        }
        SimilarityFunction::Euclidean => {
            let squared: f64 = a
                .iter()
                .zip(b)
                .map(|(x, y)| (f64::from(*x) - f64::from(*y)).powi(2))
                .sum();
            1.0 / (1.0 + squared)
        }
    }
}
