//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "askrio")]
#[command(about = "Askrio - natural-language analytics for Rio's 1746 service calls", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to askrio.yaml in the working directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the vector index from distinct warehouse values
    Index {
        /// Rebuild only this configured column
        #[arg(short = 'C', long)]
        column: Option<String>,
    },

    /// Show indexed collections and their entry counts
    Status,

    /// Ask a single question and print the answer
    Ask {
        /// Question in natural language (Portuguese)
        question: String,
    },

    /// Interactive question-and-answer session
    Chat,
}
