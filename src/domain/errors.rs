//! Domain errors for the codembed pipeline.

use thiserror::Error;

use super::models::RecordId;

/// Domain-level errors raised by graph store adapters and services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Embedding for record {id} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        id: RecordId,
        expected: usize,
        actual: usize,
    },

    #[error("Vector index '{name}' operation failed: {reason}")]
    IndexError { name: String, reason: String },

    #[error("Batch at offset {offset} failed: {reason}")]
    BatchFailed { offset: u64, reason: String },

    #[error("Embedding failed: {0}")]
    EmbeddingFailed(#[from] EmbedError),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Typed outcome of a failed call to the embedding inference service.
///
/// The token-limit case carries enough information for the adapter to decide
/// whether a truncate-and-resubmit cycle is still allowed; every other case
/// is terminal for the batch.
#[derive(Debug, Clone, Error)]
pub enum EmbedError {
    /// HTTP 400 whose `error` message reports an input-length violation.
    #[error("Input exceeds the model token limit: {message}")]
    TokenLimit { message: String },

    /// Any other non-success status that the HTTP layer did not retry.
    #[error("Inference service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Timeouts, connection failures, or exhausted transient retries.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered 2xx with a body that is not a list of vectors.
    #[error("Failed to decode embedding response: {0}")]
    Decode(String),

    /// The tokenizer could not encode or decode an input during truncation.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

impl EmbedError {
    /// Returns true if truncating the inputs could make a resubmission succeed.
    pub const fn is_token_limit(&self) -> bool {
        matches!(self, Self::TokenLimit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_limit_classification() {
        let err = EmbedError::TokenLimit {
            message: "Input validation error: inputs must have less than 512 tokens".to_string(),
        };
        assert!(err.is_token_limit());
        assert!(!EmbedError::Transport("timed out".to_string()).is_token_limit());
        assert!(!EmbedError::Rejected {
            status: 400,
            body: "bad".to_string()
        }
        .is_token_limit());
    }

    #[test]
    fn test_embed_error_converts_to_domain_error() {
        let err: DomainError = EmbedError::Decode("not an array".to_string()).into();
        assert!(matches!(err, DomainError::EmbeddingFailed(EmbedError::Decode(_))));
        assert!(err.to_string().contains("not an array"));
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = DomainError::DimensionMismatch {
            id: RecordId(7),
            expected: 384,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Embedding for record 7 has 3 dimensions, expected 384"
        );
    }
}
