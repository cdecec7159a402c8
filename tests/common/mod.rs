//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

use std::sync::Arc;
use std::time::Duration;

use codembed::adapters::embeddings::InferenceEmbeddingService;
use codembed::adapters::memory::InMemoryGraphStore;
use codembed::infrastructure::http::{RetryPolicy, RetryingHttpClient};
use codembed::infrastructure::tokenizer::BpeTokenizer;
use codembed::domain::ports::Tokenizer;

/// Token used by every mocked inference endpoint
pub const TEST_TOKEN: &str = "hf_test_token";

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Retry policy with millisecond delays so retry tests finish quickly
#[allow(dead_code)]
pub fn fast_retry_policy(total_retries: u32) -> RetryPolicy {
    RetryPolicy::new(
        total_retries,
        Duration::from_millis(1),
        Duration::from_millis(5),
    )
}

#[allow(dead_code)]
pub fn bpe_tokenizer() -> Arc<dyn Tokenizer> {
    Arc::new(BpeTokenizer::cl100k().expect("cl100k tokenizer should load"))
}

/// Inference service posting to `{server_uri}/embed`
#[allow(dead_code)]
pub fn inference_service(
    server_uri: &str,
    total_retries: u32,
    max_tokens_per_item: usize,
) -> InferenceEmbeddingService {
    let client = RetryingHttpClient::new(
        format!("{server_uri}/embed"),
        TEST_TOKEN,
        Duration::from_secs(5),
        fast_retry_policy(total_retries),
    )
    .expect("client should build");

    InferenceEmbeddingService::new(client, bpe_tokenizer(), max_tokens_per_item, 1)
}

/// Store holding methods `1..=n` whose source text is `method-{id}`
#[allow(dead_code)]
pub fn seeded_store(n: i64) -> InMemoryGraphStore {
    InMemoryGraphStore::with_methods((1..=n).map(|id| (id, format!("method-{id}"))))
}

/// Deterministic vector for a text, used by fake endpoints and embedders
#[allow(dead_code)]
pub fn vector_for(text: &str, dimensions: usize) -> Vec<f32> {
    let seed = text
        .bytes()
        .fold(7_u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    (0..dimensions)
        .map(|i| {
            let v = seed.wrapping_add(u32::try_from(i).unwrap_or(0).wrapping_mul(2_654_435_761));
            f32::from(u16::try_from(v % 1000).unwrap_or(0)) / 1000.0 + 0.001
        })
        .collect()
}
