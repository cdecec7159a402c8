//! Table output formatting for CLI commands
//!
//! Renders search matches and run reports with comfy-table.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{RunReport, SimilarMethod};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format similarity matches, best first
    pub fn format_matches(&self, matches: &[SimilarMethod]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("Method").add_attribute(Attribute::Bold),
        ]);

        for (rank, hit) in matches.iter().enumerate() {
            let score = Cell::new(format!("{:.4}", hit.similarity)).set_alignment(CellAlignment::Right);
            let score = if self.use_colors {
                score.fg(score_color(hit.similarity))
            } else {
                score
            };
            let code = hit
                .code
                .as_deref()
                .map_or_else(|| "-".to_string(), |code| first_line(code, 60));

            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(hit.id),
                score,
                Cell::new(code),
            ]);
        }

        table.to_string()
    }

    /// Format the summary of an embedding run
    pub fn format_report(&self, report: &RunReport) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Field").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let skipped = Cell::new(format!(
            "{} ({} batches)",
            report.skipped_records, report.skipped_batches
        ));
        let skipped = if self.use_colors && report.skipped_batches > 0 {
            skipped.fg(Color::Yellow)
        } else {
            skipped
        };

        table.add_row(vec![Cell::new("Run"), Cell::new(report.run_id)]);
        table.add_row(vec![Cell::new("Scope"), Cell::new(format!("{:?}", report.scope))]);
        table.add_row(vec![Cell::new("Methods in scope"), Cell::new(report.total)]);
        table.add_row(vec![Cell::new("Embedded"), Cell::new(report.embedded)]);
        table.add_row(vec![Cell::new("Skipped"), skipped]);
        table.add_row(vec![
            Cell::new("Index rebuilt"),
            Cell::new(if report.index_ready { "yes" } else { "no" }),
        ]);
        if let Some(finished_at) = report.finished_at {
            let elapsed = finished_at - report.started_at;
            table.add_row(vec![
                Cell::new("Duration"),
                Cell::new(format!("{:.1}s", elapsed.num_milliseconds() as f64 / 1000.0)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

fn score_color(similarity: f64) -> Color {
    if similarity >= 0.9 {
        Color::Green
    } else if similarity >= 0.75 {
        Color::Yellow
    } else {
        Color::Reset
    }
}

/// First non-empty line of `code`, cut to `max_chars`
fn first_line(code: &str, max_chars: usize) -> String {
    let line = code.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if line.chars().count() <= max_chars {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
