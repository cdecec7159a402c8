//! Embedding pipeline.
//!
//! Pages through method records, embeds each page with one inference call
//! and writes the vectors back, after rebuilding the vector index the
//! similarity search runs against.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Config, Embedding, FailurePolicy, MethodRecord, PageOutcome, PageProgress, RecordId,
    RecordScope, RunReport, SkipReason, VectorIndexSpec,
};
use crate::domain::ports::{EmbeddingService, GraphStore, ProgressSink};
use crate::services::index_maintenance::IndexMaintenance;

/// Settings of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Records per page and per inference request
    pub batch_size: usize,
    /// Length every vector must have before it is written
    pub dimensions: usize,
    pub index: VectorIndexSpec,
    pub scope: RecordScope,
    pub failure_policy: FailurePolicy,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.pipeline.batch_size,
            dimensions: config.inference.dimensions,
            index: config.index_spec(),
            scope: config.pipeline.scope,
            failure_policy: config.pipeline.failure_policy,
        }
    }
}

/// Orchestrates index rebuild and batch embedding over a graph store.
///
/// One page is in flight at a time. A page that cannot be embedded in full
/// is skipped without writing anything; under [`FailurePolicy::BestEffort`]
/// the run then moves on to the next page.
pub struct EmbeddingPipeline {
    store: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingService>,
    settings: PipelineSettings,
}

impl EmbeddingPipeline {
    pub fn new(
        store: Arc<dyn GraphStore>,
        embedder: Arc<dyn EmbeddingService>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            embedder,
            settings,
        }
    }

    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Drop and recreate the vector index under the run's failure policy.
    ///
    /// Returns whether the index is in place afterwards.
    pub async fn rebuild_index(&self) -> DomainResult<bool> {
        IndexMaintenance::new(
            Arc::clone(&self.store),
            self.settings.index.clone(),
            self.settings.failure_policy,
        )
        .rebuild()
        .await
    }

    /// Rebuild the index, then embed every record in scope.
    pub async fn run(&self, progress: &dyn ProgressSink) -> DomainResult<RunReport> {
        let scope = self.settings.scope;
        let batch_size = self.settings.batch_size.max(1);
        let mut report = RunReport::start(scope);

        report.index_ready = self.rebuild_index().await?;

        let total = self.store.count_records(scope).await?;
        report.total = total;
        progress.on_total(total);
        info!(
            run_id = %report.run_id,
            total,
            batch_size,
            scope = ?scope,
            embedder = self.embedder.name(),
            "Found {total} methods to embed"
        );

        // `visited` counts records seen so far; `offset` is where the next
        // page starts in the store's current result set.
        let mut visited = 0_u64;
        let mut offset = 0_u64;

        while visited < total {
            let page = self.store.fetch_page(scope, offset, batch_size).await?;
            if page.is_empty() {
                warn!(visited, total, offset, "Record set shrank during the run; stopping early");
                break;
            }

            let start = visited;
            let end = visited + page.len() as u64;
            info!(
                offset,
                batch_size = page.len(),
                total,
                "Embedding methods {} to {end} of {total}",
                start + 1
            );

            let outcome = self.process_page(&page).await;
            visited = end;
            if scope == RecordScope::All || matches!(outcome, PageOutcome::Skipped { .. }) {
                offset += page.len() as u64;
            }

            report.record(&outcome);
            progress.on_page(&PageProgress {
                start,
                end,
                total,
                outcome: outcome.clone(),
            });

            if let PageOutcome::Skipped { reason, .. } = outcome {
                if self.settings.failure_policy == FailurePolicy::Strict {
                    report.finish();
                    progress.on_finish(&report);
                    error!(
                        run_id = %report.run_id,
                        embedded = report.embedded,
                        skipped_batches = report.skipped_batches,
                        skipped_records = report.skipped_records,
                        index_ready = report.index_ready,
                        offset = start,
                        "Embedding run aborted"
                    );
                    return Err(DomainError::BatchFailed {
                        offset: start,
                        reason: reason.to_string(),
                    });
                }
            }
        }

        report.finish();
        progress.on_finish(&report);
        info!(
            run_id = %report.run_id,
            embedded = report.embedded,
            skipped_batches = report.skipped_batches,
            skipped_records = report.skipped_records,
            index_ready = report.index_ready,
            "Embedding run finished"
        );

        Ok(report)
    }

    /// Embed one page and write it back, or skip it.
    async fn process_page(&self, page: &[MethodRecord]) -> PageOutcome {
        let records = page.len();
        let texts: Vec<String> = page.iter().map(|record| record.code.clone()).collect();

        let embeddings = match self.embedder.embed_batch(&texts).await {
            Ok(embeddings) => embeddings,
            Err(err) => {
                warn!(error = %err, batch_size = records, "Embedding failed; skipping batch");
                return PageOutcome::Skipped {
                    records,
                    reason: SkipReason::EmbeddingFailed {
                        message: err.to_string(),
                    },
                };
            }
        };

        if let Some(reason) = self.check_embeddings(records, &embeddings) {
            warn!(reason = %reason, batch_size = records, "Embedding count mismatch; skipping batch");
            return PageOutcome::Skipped { records, reason };
        }

        let batch: Vec<(RecordId, Embedding)> = page
            .iter()
            .map(|record| record.id)
            .zip(embeddings)
            .collect();

        match self.store.write_embeddings(&batch).await {
            Ok(_) => PageOutcome::Embedded { records },
            Err(err) => {
                warn!(error = %err, batch_size = records, "Writing embeddings failed; skipping batch");
                PageOutcome::Skipped {
                    records,
                    reason: SkipReason::WriteFailed {
                        message: err.to_string(),
                    },
                }
            }
        }
    }

    /// A reason to reject the service's answer for a page of `expected` texts
    fn check_embeddings(&self, expected: usize, embeddings: &[Embedding]) -> Option<SkipReason> {
        if embeddings.len() != expected {
            return Some(SkipReason::CountMismatch {
                expected,
                actual: embeddings.len(),
            });
        }

        embeddings
            .iter()
            .find(|vector| vector.len() != self.settings.dimensions)
            .map(|vector| SkipReason::DimensionMismatch {
                expected: self.settings.dimensions,
                actual: vector.len(),
            })
    }
}
