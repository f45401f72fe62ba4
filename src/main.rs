//! Askrio CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use askrio::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Index { column } => {
            askrio::cli::commands::index::execute(column, cli.config.as_deref(), cli.json).await
        }
        Commands::Status => {
            askrio::cli::commands::status::execute(cli.config.as_deref(), cli.json).await
        }
        Commands::Ask { question } => {
            askrio::cli::commands::ask::execute(&question, cli.config.as_deref(), cli.json).await
        }
        Commands::Chat => askrio::cli::commands::chat::execute(cli.config.as_deref()).await,
    };

    if let Err(err) = result {
        askrio::cli::handle_error(err, cli.json);
    }
}
