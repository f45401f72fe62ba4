//! Table output formatting for CLI commands
//!
//! Provides formatted table output for index build reports and collection
//! listings using comfy-table. Supports color-coded cells, automatic column
//! sizing, and accessibility features.

use crate::domain::models::report::{BuildReport, ColumnBuildOutcome, ColumnStatus};
use crate::domain::ports::collections::CollectionInfo;
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<usize>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub fn with_config(use_colors: bool, max_width: Option<usize>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format an index build report as a table
    pub fn format_build_report(&self, report: &BuildReport) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Column").add_attribute(Attribute::Bold),
            Cell::new("Collection").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Values").add_attribute(Attribute::Bold),
            Cell::new("Stored").add_attribute(Attribute::Bold),
            Cell::new("Time (ms)").add_attribute(Attribute::Bold),
        ]);

        for outcome in &report.columns {
            let label = status_label(outcome);

            let status_cell = if self.use_colors {
                Cell::new(&label).fg(status_color(outcome))
            } else {
                Cell::new(format!("{} {}", status_icon(outcome), label))
            };

            table.add_row(vec![
                Cell::new(&outcome.column),
                Cell::new(&outcome.collection),
                status_cell,
                Cell::new(outcome.values.to_string()),
                Cell::new(outcome.stored.to_string()),
                Cell::new(outcome.elapsed_ms.to_string()),
            ]);
        }

        table.to_string()
    }

    /// Format the collection listing as a table
    pub fn format_collections(&self, collections: &[CollectionInfo]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Collection").add_attribute(Attribute::Bold),
            Cell::new("Dimension").add_attribute(Attribute::Bold),
            Cell::new("Entries").add_attribute(Attribute::Bold),
        ]);

        for info in collections {
            let entries_cell = if self.use_colors && info.entries == 0 {
                Cell::new("0").fg(Color::Yellow)
            } else {
                Cell::new(info.entries.to_string())
            };

            table.add_row(vec![
                Cell::new(&info.name),
                Cell::new(info.dimension.to_string()),
                entries_cell,
            ]);
        }

        table.to_string()
    }

    /// Create a base table with common settings
    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        // Use UTF-8 preset for nice borders
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        // Apply max width if set
        if let Some(width) = self.max_width {
            table.set_width(width as u16);
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
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check for dumb terminal
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

/// Human-readable status, with the degraded-batch count when present
fn status_label(outcome: &ColumnBuildOutcome) -> String {
    match &outcome.status {
        ColumnStatus::Built if outcome.is_degraded() => {
            format!("built ({} degraded)", outcome.degraded_batches.len())
        }
        ColumnStatus::Built => "built".to_string(),
        ColumnStatus::SkippedEmpty => "skipped (no values)".to_string(),
        ColumnStatus::Failed(reason) => format!("failed: {}", truncate_text(reason, 40)),
    }
}

/// Map a column outcome to a color
fn status_color(outcome: &ColumnBuildOutcome) -> Color {
    match &outcome.status {
        ColumnStatus::Built if outcome.is_degraded() => Color::Yellow,
        ColumnStatus::Built => Color::Green,
        ColumnStatus::SkippedEmpty => Color::DarkGrey,
        ColumnStatus::Failed(_) => Color::Red,
    }
}

/// Map a column outcome to an icon
fn status_icon(outcome: &ColumnBuildOutcome) -> &'static str {
    match &outcome.status {
        ColumnStatus::Built if outcome.is_degraded() => "⚠",
        ColumnStatus::Built => "✓",
        ColumnStatus::SkippedEmpty => "○",
        ColumnStatus::Failed(_) => "✗",
    }
}

/// Truncate text to max length with ellipsis
fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
