//! Status command handler
//!
//! Lists stored collections with their dimensions and entry counts.

use std::path::Path;

use anyhow::Result;

use crate::cli::output::TableFormatter;
use crate::domain::ports::CollectionStore;

use super::{load_config, open_store};

/// Print the collection listing.
pub async fn execute(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config).await?;
    let collections = store.list_collections().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&collections)?);
        return Ok(());
    }

    if collections.is_empty() {
        println!("No collections stored yet. Run `askrio index` to build them.");
        return Ok(());
    }

    let formatter = TableFormatter::new();
    println!("{}", formatter.format_collections(&collections));

    let total: u64 = collections.iter().map(|c| c.entries).sum();
    println!("{} entries across {} collection(s).", total, collections.len());
    Ok(())
}
