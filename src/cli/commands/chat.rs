//! Chat command handler
//!
//! Interactive question loop. Checks the vector index at startup but never
//! refuses to run without it: similarity lookups degrade to LIKE-pattern
//! guidance until `askrio index` has been run.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use console::style;

use crate::cli::output::create_spinner;

use super::{build_agent, load_config, report_missing_collections};

const EXIT_WORDS: [&str; 3] = ["sair", "quit", "exit"];

/// Run the interactive session until an exit word or EOF.
pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let (agent, store) = build_agent(&config).await?;

    report_missing_collections(&config, store.as_ref()).await;

    println!(
        "{}",
        style("Assistente de dados 1746 - Prefeitura do Rio de Janeiro").bold()
    );
    println!(
        "{}",
        style("Digite sua pergunta ('sair' encerra a sessão)").dim()
    );
    println!();

    let stdin = io::stdin();
    loop {
        print!("{} ", style("pergunta>").cyan().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&question.to_lowercase().as_str()) {
            break;
        }

        let spinner = create_spinner("Processando...");
        let state = agent.answer(question).await;
        spinner.finish_and_clear();

        println!("{}\n", state.final_response);
    }

    println!("{}", style("Até logo!").dim());
    Ok(())
}
