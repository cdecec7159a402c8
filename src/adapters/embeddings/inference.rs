//! Feature-extraction inference endpoint adapter.
//!
//! Talks to HuggingFace-style embedding endpoints (Inference API, Inference
//! Endpoints, text-embeddings-inference): `POST {"inputs": [...]}` answered
//! by a JSON array of vectors in input order.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::domain::errors::EmbedError;
use crate::domain::models::{Config, Embedding};
use crate::domain::ports::{EmbeddingService, Tokenizer};
use crate::infrastructure::http::{HttpError, HttpResponse, RetryingHttpClient};
use crate::infrastructure::logging::scrub;

/// Substring of the 400 error message reporting an oversized input.
pub const TOKEN_LIMIT_MARKER: &str = "must have less than";

/// Embedding service backed by a remote inference endpoint.
///
/// When the endpoint rejects a batch because an input exceeds the model's
/// token limit, every text in the batch is truncated to
/// `max_tokens_per_item` and the whole batch is resubmitted, at most
/// `truncation_retries` times.
pub struct InferenceEmbeddingService {
    client: RetryingHttpClient,
    tokenizer: Arc<dyn Tokenizer>,
    max_tokens_per_item: usize,
    truncation_retries: u32,
}

impl InferenceEmbeddingService {
    pub fn new(
        client: RetryingHttpClient,
        tokenizer: Arc<dyn Tokenizer>,
        max_tokens_per_item: usize,
        truncation_retries: u32,
    ) -> Self {
        Self {
            client,
            tokenizer,
            max_tokens_per_item,
            truncation_retries,
        }
    }

    pub fn from_config(config: &Config, tokenizer: Arc<dyn Tokenizer>) -> Result<Self, HttpError> {
        let client = RetryingHttpClient::from_config(&config.inference, &config.retry)?;
        Ok(Self::new(
            client,
            tokenizer,
            config.inference.max_tokens_per_item,
            config.pipeline.truncation_retries,
        ))
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbedError> {
        let response = self
            .client
            .post_json(&InferenceRequest { inputs: texts })
            .await
            .map_err(|e| EmbedError::Transport(scrub(&e.to_string())))?;
        classify_response(&response)
    }

    fn truncate_all(&self, texts: &[String]) -> Result<Vec<String>, EmbedError> {
        let mut truncated_count = 0_usize;
        let truncated = texts
            .iter()
            .map(|text| {
                let result = self
                    .tokenizer
                    .truncate_to_budget(text, self.max_tokens_per_item)
                    .map_err(|e| EmbedError::Tokenizer(e.to_string()))?;
                if result.was_truncated() {
                    truncated_count += 1;
                }
                Ok(result.into_text())
            })
            .collect::<Result<Vec<_>, EmbedError>>()?;

        info!(
            truncated = truncated_count,
            batch_size = texts.len(),
            max_tokens = self.max_tokens_per_item,
            "truncated oversized methods"
        );
        Ok(truncated)
    }
}

#[async_trait]
impl EmbeddingService for InferenceEmbeddingService {
    fn name(&self) -> &'static str {
        "inference"
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut attempts_left = self.truncation_retries;
        let mut truncated: Option<Vec<String>> = None;

        loop {
            let inputs = truncated.as_deref().unwrap_or(texts);
            match self.request(inputs).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(err) if err.is_token_limit() && attempts_left > 0 => {
                    attempts_left -= 1;
                    warn!(error = %err, "hit token limit; truncating batch and retrying");
                    truncated = Some(self.truncate_all(inputs)?);
                }
                Err(err) => {
                    error!(error = %err, "embedding request failed");
                    return Err(err);
                }
            }
        }
    }

    async fn embed_query(&self, text: &str) -> Result<Embedding, EmbedError> {
        let mut embeddings = self.embed_batch(&[text.to_string()]).await?;
        if embeddings.len() != 1 {
            return Err(EmbedError::Decode(format!(
                "expected 1 embedding for query, got {}",
                embeddings.len()
            )));
        }
        Ok(embeddings.remove(0))
    }
}

/// Turn a response the HTTP layer did not retry into vectors or a typed error
fn classify_response(response: &HttpResponse) -> Result<Vec<Embedding>, EmbedError> {
    if response.is_success() {
        let vectors: VectorsResponse = response
            .json()
            .map_err(|e| EmbedError::Decode(e.to_string()))?;
        return Ok(vectors.into_embeddings());
    }

    if response.status == StatusCode::BAD_REQUEST {
        if let Some(message) = error_message(&response.body) {
            if message.contains(TOKEN_LIMIT_MARKER) {
                return Err(EmbedError::TokenLimit { message });
            }
        }
    }

    Err(EmbedError::Rejected {
        status: response.status.as_u16(),
        body: scrub(&response.body),
    })
}

/// The `error` string of a JSON error body, if there is one
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.error? {
        serde_json::Value::String(message) => Some(message),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}

// -- Inference API request/response types --

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<serde_json::Value>,
}

/// Batched endpoints answer `[[...], ...]`; some single-input deployments
/// answer a bare `[...]`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VectorsResponse {
    Batch(Vec<Embedding>),
    Single(Embedding),
}

impl VectorsResponse {
    fn into_embeddings(self) -> Vec<Embedding> {
        match self {
            Self::Batch(vectors) => vectors,
            Self::Single(vector) => vec![vector],
        }
    }
}
