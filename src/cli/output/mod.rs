//! CLI output formatting module
//!
//! Provides table and progress formatters for terminal display.

pub mod progress;
pub mod table;

pub use progress::create_spinner;
pub use table::TableFormatter;
