//! Neo4j implementation of the graph store port.

use async_trait::async_trait;
use neo4rs::{query, Graph, Query};
use tracing::{debug, instrument};

use super::queries::CypherQueries;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Embedding, GraphConfig, MethodRecord, RecordId, RecordScope, SimilarMethod, VectorIndexSpec,
};
use crate::domain::ports::GraphStore;
use crate::infrastructure::logging::scrub;

impl From<neo4rs::Error> for DomainError {
    fn from(err: neo4rs::Error) -> Self {
        Self::DatabaseError(scrub(&err.to_string()))
    }
}

/// Graph store backed by a Neo4j database over Bolt.
pub struct Neo4jGraphStore {
    graph: Graph,
    queries: CypherQueries,
}

impl Neo4jGraphStore {
    /// Connect using the URI and credentials from configuration
    pub async fn connect(config: &GraphConfig) -> DomainResult<Self> {
        let graph = Graph::new(&config.uri, &config.user, &config.password)
            .await
            .map_err(|e| {
                DomainError::DatabaseError(scrub(&format!(
                    "Failed to connect to {}: {e}",
                    config.uri
                )))
            })?;
        debug!(uri = %scrub(&config.uri), "connected to graph store");

        Ok(Self {
            graph,
            queries: CypherQueries::from_config(config),
        })
    }

    async fn fetch_rows<T>(
        &self,
        q: Query,
        mut map: impl FnMut(neo4rs::Row) -> DomainResult<T> + Send,
    ) -> DomainResult<Vec<T>>
    where
        T: Send,
    {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(map(row)?);
        }
        Ok(rows)
    }
}

fn column<'row, T: serde::Deserialize<'row>>(row: &'row neo4rs::Row, key: &str) -> DomainResult<T> {
    row.get::<T>(key)
        .map_err(|e| DomainError::DatabaseError(format!("Failed to read column '{key}': {e}")))
}

fn to_i64(value: impl TryInto<i64>, what: &str) -> DomainResult<i64> {
    value
        .try_into()
        .map_err(|_| DomainError::ValidationFailed(format!("{what} does not fit in a 64-bit integer")))
}

fn to_bolt_vector(embedding: &[f32]) -> Vec<f64> {
    embedding.iter().map(|v| f64::from(*v)).collect()
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn count_records(&self, scope: RecordScope) -> DomainResult<u64> {
        let totals = self
            .fetch_rows(query(&self.queries.count(scope)), |row| {
                column::<i64>(&row, "total")
            })
            .await?;
        let total = totals.first().copied().unwrap_or(0);
        Ok(u64::try_from(total).unwrap_or(0))
    }

    #[instrument(skip(self))]
    async fn fetch_page(
        &self,
        scope: RecordScope,
        offset: u64,
        limit: usize,
    ) -> DomainResult<Vec<MethodRecord>> {
        let q = query(&self.queries.page(scope))
            .param("skip", to_i64(offset, "offset")?)
            .param("limit", to_i64(limit, "limit")?);

        self.fetch_rows(q, |row| {
            Ok(MethodRecord::new(
                column::<i64>(&row, "id")?,
                column::<String>(&row, "code")?,
            ))
        })
        .await
    }

    #[instrument(skip(self, batch), fields(batch_size = batch.len()))]
    async fn write_embeddings(&self, batch: &[(RecordId, Embedding)]) -> DomainResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let cypher = self.queries.set_embedding();
        let statements: Vec<Query> = batch
            .iter()
            .map(|(id, embedding)| {
                query(&cypher)
                    .param("id", id.0)
                    .param("embedding", to_bolt_vector(embedding))
            })
            .collect();

        let mut txn = self.graph.start_txn().await?;
        if let Err(err) = txn.run_queries(statements).await {
            // Nothing of the batch may persist
            txn.rollback().await?;
            return Err(err.into());
        }
        txn.commit().await?;

        Ok(batch.len())
    }

    async fn drop_index_if_exists(&self, name: &str) -> DomainResult<()> {
        self.graph
            .run(query(&CypherQueries::drop_index(name)))
            .await
            .map_err(|e| DomainError::IndexError {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    async fn create_vector_index(&self, spec: &VectorIndexSpec) -> DomainResult<()> {
        self.graph
            .run(query(&CypherQueries::create_vector_index(spec)))
            .await
            .map_err(|e| DomainError::IndexError {
                name: spec.name.clone(),
                reason: e.to_string(),
            })
    }

    async fn query_similar(
        &self,
        index_name: &str,
        k: usize,
        embedding: &[f32],
    ) -> DomainResult<Vec<SimilarMethod>> {
        let q = query(&self.queries.query_nodes())
            .param("index", index_name)
            .param("k", to_i64(k, "k")?)
            .param("embedding", to_bolt_vector(embedding));

        self.fetch_rows(q, |row| {
            Ok(SimilarMethod {
                id: RecordId(column::<i64>(&row, "id")?),
                similarity: column::<f64>(&row, "similarity")?,
                code: column::<Option<String>>(&row, "code")?,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bolt_vector_widens_floats() {
        assert_eq!(to_bolt_vector(&[0.5, -1.0]), vec![0.5_f64, -1.0_f64]);
    }

    #[test]
    fn test_to_i64_rejects_overflow() {
        assert_eq!(to_i64(30_usize, "limit").unwrap(), 30);
        assert!(to_i64(u64::MAX, "offset").is_err());
    }
}
