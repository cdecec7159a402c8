//! Progress reporting port for pipeline runs.

use crate::domain::models::{PageProgress, RunReport};

/// Receives progress notifications from a pipeline run.
pub trait ProgressSink: Send + Sync {
    /// Called once the number of eligible records is known.
    fn on_total(&self, total: u64);

    /// Called after each page has been embedded or skipped.
    fn on_page(&self, progress: &PageProgress);

    /// Called when the run completes, or stops early under the strict policy.
    fn on_finish(&self, report: &RunReport);
}

/// A progress sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_total(&self, _total: u64) {}

    fn on_page(&self, _progress: &PageProgress) {}

    fn on_finish(&self, _report: &RunReport) {}
}
