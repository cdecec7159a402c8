//! Cypher statements for method records and the vector index.
//!
//! Labels, properties and index names cannot be query parameters in Cypher,
//! so they are interpolated; they are validated as identifiers when the
//! configuration loads and back-quoted here.

use crate::domain::models::{GraphConfig, RecordScope, VectorIndexSpec};

/// Quote a label, property or index name for interpolation.
pub fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Statements bound to one label / text property / embedding property.
#[derive(Debug, Clone)]
pub struct CypherQueries {
    label: String,
    text_property: String,
    embedding_property: String,
}

impl CypherQueries {
    pub fn new(
        label: impl Into<String>,
        text_property: impl Into<String>,
        embedding_property: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            text_property: text_property.into(),
            embedding_property: embedding_property.into(),
        }
    }

    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(
            &config.label,
            &config.text_property,
            &config.embedding_property,
        )
    }

    fn predicate(&self, scope: RecordScope) -> String {
        let text = format!("m.{} IS NOT NULL", quote(&self.text_property));
        match scope {
            RecordScope::All => text,
            RecordScope::Unembedded => {
                format!("{text} AND m.{} IS NULL", quote(&self.embedding_property))
            }
        }
    }

    /// Returns `total`
    pub fn count(&self, scope: RecordScope) -> String {
        format!(
            "MATCH (m:{}) WHERE {} RETURN count(m) AS total",
            quote(&self.label),
            self.predicate(scope)
        )
    }

    /// Takes `$skip`, `$limit`; returns `id`, `code`
    pub fn page(&self, scope: RecordScope) -> String {
        format!(
            "MATCH (m:{}) WHERE {} RETURN id(m) AS id, m.{} AS code ORDER BY id(m) SKIP $skip LIMIT $limit",
            quote(&self.label),
            self.predicate(scope),
            quote(&self.text_property)
        )
    }

    /// Takes `$id`, `$embedding`
    pub fn set_embedding(&self) -> String {
        format!(
            "MATCH (m:{}) WHERE id(m) = $id SET m.{} = $embedding",
            quote(&self.label),
            quote(&self.embedding_property)
        )
    }

    pub fn drop_index(name: &str) -> String {
        format!("DROP INDEX {} IF EXISTS", quote(name))
    }

    pub fn create_vector_index(spec: &VectorIndexSpec) -> String {
        format!(
            "CREATE VECTOR INDEX {} IF NOT EXISTS FOR (m:{}) ON (m.{}) \
             OPTIONS {{ indexConfig: {{ `vector.dimensions`: {}, `vector.similarity_function`: '{}' }} }}",
            quote(&spec.name),
            quote(&spec.label),
            quote(&spec.property),
            spec.dimensions,
            spec.similarity.as_str()
        )
    }

    /// Takes `$index`, `$k`, `$embedding`; returns `id`, `code`, `similarity`
    pub fn query_nodes(&self) -> String {
        format!(
            "CALL db.index.vector.queryNodes($index, $k, $embedding) YIELD node, score \
             RETURN id(node) AS id, node.{} AS code, score AS similarity \
             ORDER BY similarity DESC",
            quote(&self.text_property)
        )
    }
}
