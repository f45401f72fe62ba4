//! Ask command handler
//!
//! Runs one question through the agent workflow and prints the final answer.
//! The workflow itself never fails; only configuration or wiring problems
//! surface as errors here.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::cli::output::create_spinner;

use super::{build_agent, load_config, report_missing_collections};

/// Answer a single question.
pub async fn execute(question: &str, config_path: Option<&Path>, json_output: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let (agent, store) = build_agent(&config).await?;

    report_missing_collections(&config, store.as_ref()).await;

    let spinner = create_spinner("Processando pergunta...");
    let state = agent.answer(question).await;
    spinner.finish_and_clear();

    if json_output {
        let payload = json!({
            "question": state.question,
            "route": state.route,
            "sql_query": state.sql_query,
            "rows_returned": state.rows.len(),
            "error": state.error,
            "answer": state.final_response,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", state.final_response);
    }

    Ok(())
}
