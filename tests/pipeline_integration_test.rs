//! End-to-end pipeline tests against a mocked inference endpoint and the
//! in-memory graph store.

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use codembed::domain::models::{FailurePolicy, RecordScope, VectorIndexSpec};
use codembed::domain::ports::NullProgress;
use codembed::services::{EmbeddingPipeline, PipelineSettings, SimilaritySearch};
use codembed::{DomainError, GraphStore, RecordId};
use common::{inference_service, seeded_store, vector_for};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const DIM: usize = 8;

/// Embeds each input deterministically; selected calls misbehave.
struct EmbeddingEndpoint {
    calls: AtomicUsize,
    /// 1-based calls answered with 422
    failing_calls: HashSet<usize>,
    /// 1-based calls answered with one vector too few
    short_calls: HashSet<usize>,
}

impl EmbeddingEndpoint {
    fn healthy() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing_calls: HashSet::new(),
            short_calls: HashSet::new(),
        }
    }
}

impl Respond for EmbeddingEndpoint {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_calls.contains(&call) {
            return ResponseTemplate::new(422).set_body_json(serde_json::json!({"error": "bad input"}));
        }

        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let inputs: Vec<String> = serde_json::from_value(body["inputs"].clone()).unwrap();
        let mut vectors: Vec<Vec<f32>> = inputs.iter().map(|text| vector_for(text, DIM)).collect();
        if self.short_calls.contains(&call) {
            vectors.pop();
        }
        ResponseTemplate::new(200).set_body_json(vectors)
    }
}

fn settings(batch_size: usize, scope: RecordScope, failure_policy: FailurePolicy) -> PipelineSettings {
    PipelineSettings {
        batch_size,
        dimensions: DIM,
        index: VectorIndexSpec::new("methodEmbeddings", "Method", "embedding", DIM),
        scope,
        failure_policy,
    }
}

async fn mount(endpoint: EmbeddingEndpoint) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::method("POST"))
        .respond_with(endpoint)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_65_methods_with_failing_second_batch() {
    common::setup_test_logging();
    let server = mount(EmbeddingEndpoint {
        failing_calls: HashSet::from([2]),
        ..EmbeddingEndpoint::healthy()
    })
    .await;
    let store = seeded_store(65);

    let pipeline = EmbeddingPipeline::new(
        Arc::new(store.clone()),
        Arc::new(inference_service(&server.uri(), 0, 512)),
        settings(30, RecordScope::Unembedded, FailurePolicy::BestEffort),
    );
    let report = pipeline.run(&NullProgress).await.unwrap();

    let embedded: Vec<i64> = store.embedded_ids().await.iter().map(|id| id.0).collect();
    let expected: Vec<i64> = (1..=30).chain(61..=65).collect();
    assert_eq!(embedded, expected);
    assert_eq!(report.embedded, 35);
    assert_eq!(report.skipped_records, 30);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);

    // Vectors belong to the record whose text produced them
    assert_eq!(store.embedding(61).await.unwrap(), vector_for("method-61", DIM));
}

#[tokio::test]
async fn test_rerun_picks_up_skipped_batch() {
    let store = seeded_store(65);

    let flaky = mount(EmbeddingEndpoint {
        failing_calls: HashSet::from([2]),
        ..EmbeddingEndpoint::healthy()
    })
    .await;
    EmbeddingPipeline::new(
        Arc::new(store.clone()),
        Arc::new(inference_service(&flaky.uri(), 0, 512)),
        settings(30, RecordScope::Unembedded, FailurePolicy::BestEffort),
    )
    .run(&NullProgress)
    .await
    .unwrap();

    let healthy = mount(EmbeddingEndpoint::healthy()).await;
    let report = EmbeddingPipeline::new(
        Arc::new(store.clone()),
        Arc::new(inference_service(&healthy.uri(), 0, 512)),
        settings(30, RecordScope::Unembedded, FailurePolicy::BestEffort),
    )
    .run(&NullProgress)
    .await
    .unwrap();

    assert_eq!(report.total, 30);
    assert!(report.is_complete());
    assert_eq!(store.embedded_ids().await.len(), 65);
}

#[tokio::test]
async fn test_short_response_writes_nothing_for_that_batch() {
    let server = mount(EmbeddingEndpoint {
        short_calls: HashSet::from([1]),
        ..EmbeddingEndpoint::healthy()
    })
    .await;
    let store = seeded_store(10);

    let report = EmbeddingPipeline::new(
        Arc::new(store.clone()),
        Arc::new(inference_service(&server.uri(), 0, 512)),
        settings(5, RecordScope::All, FailurePolicy::BestEffort),
    )
    .run(&NullProgress)
    .await
    .unwrap();

    let embedded: Vec<i64> = store.embedded_ids().await.iter().map(|id| id.0).collect();
    assert_eq!(embedded, (6..=10).collect::<Vec<_>>());
    assert_eq!(report.skipped_batches, 1);
}

#[tokio::test]
async fn test_strict_policy_stops_the_run() {
    let server = mount(EmbeddingEndpoint {
        failing_calls: HashSet::from([1]),
        ..EmbeddingEndpoint::healthy()
    })
    .await;
    let store = seeded_store(10);

    let result = EmbeddingPipeline::new(
        Arc::new(store.clone()),
        Arc::new(inference_service(&server.uri(), 0, 512)),
        settings(5, RecordScope::All, FailurePolicy::Strict),
    )
    .run(&NullProgress)
    .await;

    assert!(matches!(result, Err(DomainError::BatchFailed { offset: 0, .. })));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(store.embedded_ids().await.is_empty());
}

#[tokio::test]
async fn test_search_finds_embedded_method() {
    let server = mount(EmbeddingEndpoint::healthy()).await;
    let store = seeded_store(12);
    let service = Arc::new(inference_service(&server.uri(), 0, 512));

    EmbeddingPipeline::new(
        Arc::new(store.clone()),
        service.clone(),
        settings(5, RecordScope::Unembedded, FailurePolicy::BestEffort),
    )
    .run(&NullProgress)
    .await
    .unwrap();

    let search = SimilaritySearch::new(Arc::new(store.clone()), service, "methodEmbeddings");
    let matches = search.search("method-7", 3).await.unwrap();

    assert_eq!(matches.len(), 3);
    assert_eq!(matches[0].id, RecordId(7));
    assert!((matches[0].similarity - 1.0).abs() < 1e-6);
    assert!(matches.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    assert_eq!(store.count_records(RecordScope::Unembedded).await.unwrap(), 0);
}
