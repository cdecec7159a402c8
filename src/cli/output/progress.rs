//! Progress bar output using indicatif
//!
//! The embed command reports pipeline progress through [`ProgressBarSink`],
//! a [`ProgressSink`] that drives a single bar counting visited methods.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::domain::models::{PageOutcome, PageProgress, RunReport};
use crate::domain::ports::ProgressSink;

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg} (ETA: {eta})";
const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";

const PROGRESS_CHARS: &str = "█▓▒░ ";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a standard progress bar with ETA calculation
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .expect("Invalid progress bar template")
            .progress_chars(PROGRESS_CHARS),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a spinner with a message, for steps of unknown length
pub fn create_spinner_with_message(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .expect("Invalid spinner template")
            .tick_chars(SPINNER_CHARS),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.into());
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);

    /// Finish with a warning message (yellow !)
    fn finish_warning(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✗ {}", message.into()));
    }

    fn finish_warning(&self, message: impl Into<String>) {
        self.finish_with_message(format!("! {}", message.into()));
    }
}

/// Pipeline progress rendered as a terminal progress bar
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    pub fn new() -> Self {
        Self {
            bar: create_progress_bar(0),
        }
    }

    /// A sink that tracks progress without drawing anything
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Stop drawing after a run that ended with an error
    pub fn abandon(&self, message: impl Into<String>) {
        if !self.bar.is_finished() {
            self.bar.finish_error(message);
        }
    }
}

impl Default for ProgressBarSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressBarSink {
    fn on_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_message("embedding methods");
    }

    fn on_page(&self, progress: &PageProgress) {
        self.bar.set_position(progress.end);
        match &progress.outcome {
            PageOutcome::Embedded { .. } => self.bar.set_message("embedding methods"),
            PageOutcome::Skipped { reason, .. } => self
                .bar
                .set_message(format!("skipped {}-{}: {reason}", progress.start + 1, progress.end)),
        }
    }

    fn on_finish(&self, report: &RunReport) {
        let summary = format!(
            "{} embedded, {} skipped",
            report.embedded, report.skipped_records
        );
        if report.skipped_batches == 0 {
            self.bar.finish_success(summary);
        } else {
            self.bar.finish_warning(summary);
        }
    }
}
