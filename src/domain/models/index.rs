//! Vector index definition

use serde::{Deserialize, Serialize};
use std::fmt;

/// Similarity function configured on a vector index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityFunction {
    #[default]
    Cosine,
    Euclidean,
}

impl SimilarityFunction {
    /// Name understood by the graph store's index options.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for SimilarityFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical definition of the embedding vector index.
///
/// Rebuilding the index from the same spec always converges to one index of
/// this name, keyed on `label`/`property`, with these options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorIndexSpec {
    pub name: String,
    pub label: String,
    pub property: String,
    pub dimensions: usize,
    pub similarity: SimilarityFunction,
}

impl VectorIndexSpec {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        property: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            property: property.into(),
            dimensions,
            similarity: SimilarityFunction::Cosine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_to_cosine() {
        let spec = VectorIndexSpec::new("methodEmbeddings", "Method", "embedding", 384);
        assert_eq!(spec.similarity, SimilarityFunction::Cosine);
        assert_eq!(spec.similarity.to_string(), "cosine");
    }

    #[test]
    fn test_similarity_serde() {
        let parsed: SimilarityFunction = serde_json::from_str("\"euclidean\"").unwrap();
        assert_eq!(parsed, SimilarityFunction::Euclidean);
    }
}
