//! Command-line interface: clap types, command handlers, and output helpers.

pub mod commands;
pub mod output;
pub mod types;

pub use output::{create_spinner, TableFormatter};
pub use types::{Cli, Commands};

/// Print a fatal error and exit non-zero.
///
/// With `--json`, the error goes to stderr as a one-key object so scripted
/// callers can always parse the stream.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        let payload = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{payload}");
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
