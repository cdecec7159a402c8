//! Pipeline run models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which records a pipeline run selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordScope {
    /// Records with source text and no embedding yet. Reruns resume.
    #[default]
    Unembedded,
    /// Every record with source text. Reruns recompute and overwrite.
    All,
}

/// How the pipeline reacts to index DDL failures and skipped batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and keep going.
    #[default]
    BestEffort,
    /// Abort the run on the first failure.
    Strict,
}

/// Why a page was skipped without writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SkipReason {
    /// The embedding service reported a failure
    EmbeddingFailed { message: String },
    /// The service returned a different number of vectors than inputs
    CountMismatch { expected: usize, actual: usize },
    /// At least one vector did not have the configured dimension
    DimensionMismatch { expected: usize, actual: usize },
    /// The graph store rejected the batch write
    WriteFailed { message: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmbeddingFailed { message } => write!(f, "embedding failed: {message}"),
            Self::CountMismatch { expected, actual } => {
                write!(f, "embedding count mismatch: expected {expected}, got {actual}")
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "embedding dimension mismatch: expected {expected}, got {actual}")
            }
            Self::WriteFailed { message } => write!(f, "write failed: {message}"),
        }
    }
}

/// Result of processing one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Embedded { records: usize },
    Skipped { records: usize, reason: SkipReason },
}

impl PageOutcome {
    pub const fn records(&self) -> usize {
        match self {
            Self::Embedded { records } | Self::Skipped { records, .. } => *records,
        }
    }
}

/// Progress of a page as seen by a [`ProgressSink`](crate::domain::ports::ProgressSink).
#[derive(Debug, Clone)]
pub struct PageProgress {
    /// Position of the first record of the page among visited records
    pub start: u64,
    /// Position one past the last record of the page
    pub end: u64,
    pub total: u64,
    pub outcome: PageOutcome,
}

/// End-of-run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub scope: RecordScope,
    /// Records matching the scope when the run counted them
    pub total: u64,
    pub pages: u64,
    pub embedded: u64,
    pub skipped_batches: u64,
    pub skipped_records: u64,
    /// False when the index rebuild failed or was not attempted
    pub index_ready: bool,
}

impl RunReport {
    pub fn start(scope: RecordScope) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            scope,
            total: 0,
            pages: 0,
            embedded: 0,
            skipped_batches: 0,
            skipped_records: 0,
            index_ready: false,
        }
    }

    pub fn record(&mut self, outcome: &PageOutcome) {
        self.pages += 1;
        match outcome {
            PageOutcome::Embedded { records } => self.embedded += *records as u64,
            PageOutcome::Skipped { records, .. } => {
                self.skipped_batches += 1;
                self.skipped_records += *records as u64;
            }
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True if every visited record was embedded.
    pub const fn is_complete(&self) -> bool {
        self.skipped_batches == 0 && self.embedded == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accumulates_outcomes() {
        let mut report = RunReport::start(RecordScope::Unembedded);
        report.total = 65;
        report.record(&PageOutcome::Embedded { records: 30 });
        report.record(&PageOutcome::Skipped {
            records: 30,
            reason: SkipReason::CountMismatch {
                expected: 30,
                actual: 0,
            },
        });
        report.record(&PageOutcome::Embedded { records: 5 });
        report.finish();

        assert_eq!(report.pages, 3);
        assert_eq!(report.embedded, 35);
        assert_eq!(report.skipped_batches, 1);
        assert_eq!(report.skipped_records, 30);
        assert!(report.finished_at.is_some());
        assert!(!report.is_complete());
    }

    #[test]
    fn test_scope_and_policy_serde() {
        let scope: RecordScope = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(scope, RecordScope::All);
        let policy: FailurePolicy = serde_json::from_str("\"best_effort\"").unwrap();
        assert_eq!(policy, FailurePolicy::BestEffort);
        assert_eq!(RecordScope::default(), RecordScope::Unembedded);
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::CountMismatch {
            expected: 30,
            actual: 29,
        };
        assert_eq!(
            reason.to_string(),
            "embedding count mismatch: expected 30, got 29"
        );
    }
}
