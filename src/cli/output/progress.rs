//! Spinner utilities using indicatif for terminal output
//!
//! Index rebuilds and agent turns have no useful completion fraction, so the
//! CLI shows elapsed-time spinners. Drawing goes to stderr, which keeps
//! stdout clean for answers and `--json` payloads.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for an operation of unknown duration
///
/// # Example
/// ```
/// use askrio::cli::output::progress::create_spinner;
///
/// let spinner = create_spinner("Rebuilding collections...");
/// // do work
/// spinner.finish_and_clear();
/// ```
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .expect("Invalid spinner template")
            .tick_chars(SPINNER_CHARS),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
