//! CLI output formatting module

pub mod progress;
pub mod table;

pub use progress::{ProgressBarExt, ProgressBarSink};
pub use table::TableFormatter;
