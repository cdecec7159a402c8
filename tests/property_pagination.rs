//! Every record in scope is handed to the embedding service exactly once,
//! whatever the record count, page size, scope and failing pages.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use codembed::adapters::memory::InMemoryGraphStore;
use codembed::domain::models::{Embedding, FailurePolicy, RecordScope, VectorIndexSpec};
use codembed::domain::ports::{EmbeddingService, NullProgress};
use codembed::services::{EmbeddingPipeline, PipelineSettings};
use codembed::EmbedError;
use proptest::prelude::*;

/// Records every text it is asked to embed; listed calls fail.
struct RecordingEmbedder {
    seen: Mutex<Vec<String>>,
    calls: Mutex<usize>,
    failing_calls: HashSet<usize>,
}

#[async_trait]
impl EmbeddingService for RecordingEmbedder {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbedError> {
        self.seen.lock().unwrap().extend(texts.iter().cloned());
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.failing_calls.contains(&call) {
            return Err(EmbedError::Transport("injected".to_string()));
        }
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }

    async fn embed_query(&self, _text: &str) -> Result<Embedding, EmbedError> {
        Ok(vec![1.0, 0.0])
    }
}

fn run_pipeline(
    total: i64,
    batch_size: usize,
    scope: RecordScope,
    failing_calls: HashSet<usize>,
) -> (Vec<String>, codembed::RunReport) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let store = InMemoryGraphStore::with_methods((1..=total).map(|id| (id, format!("m{id}"))));
        let embedder = Arc::new(RecordingEmbedder {
            seen: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
            failing_calls,
        });
        let pipeline = EmbeddingPipeline::new(
            Arc::new(store),
            embedder.clone(),
            PipelineSettings {
                batch_size,
                dimensions: 2,
                index: VectorIndexSpec::new("idx", "Method", "embedding", 2),
                scope,
                failure_policy: FailurePolicy::BestEffort,
            },
        );
        let report = pipeline.run(&NullProgress).await.unwrap();
        let seen = embedder.seen.lock().unwrap().clone();
        (seen, report)
    })
}

fn scope_strategy() -> impl Strategy<Value = RecordScope> {
    prop_oneof![Just(RecordScope::Unembedded), Just(RecordScope::All)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: pagination visits each record exactly once
    #[test]
    fn prop_every_record_visited_once(
        total in 0i64..120,
        batch_size in 1usize..40,
        scope in scope_strategy(),
        failing in proptest::collection::hash_set(1usize..10, 0..4),
    ) {
        let (seen, report) = run_pipeline(total, batch_size, scope, failing);

        let expected: Vec<String> = (1..=total).map(|id| format!("m{id}")).collect();
        prop_assert_eq!(&seen, &expected);

        let pages = u64::try_from(total).unwrap().div_ceil(batch_size as u64);
        prop_assert_eq!(report.pages, pages);
        prop_assert_eq!(report.embedded + report.skipped_records, report.total);
    }
}
