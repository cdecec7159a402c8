//! Method record models
//!
//! Records are created by an external ingestion process; this crate only
//! reads their source text and assigns an embedding once per run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier assigned to a record by the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A dense embedding vector of fixed dimension.
pub type Embedding = Vec<f32>;

/// A code method as read from the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub id: RecordId,
    pub code: String,
}

impl MethodRecord {
    pub fn new(id: impl Into<RecordId>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
        }
    }
}

/// A method matched by a vector similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMethod {
    pub id: RecordId,
    /// Similarity score reported by the index (higher is closer)
    pub similarity: f64,
    /// Source text of the matched method, when the store returns it
    pub code: Option<String>,
}
