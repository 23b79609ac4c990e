// SPDX-License-Identifier: MIT OR Apache-2.0

//! cvgrep - Local semantic resume search and Q&A tool
//!
//! Detects resume section headers with a layered matching chain, chunks the
//! document by section, embeds each chunk, and serves similarity queries
//! from a persistent local vector store.

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing with CVGREP_LOG env var (e.g., CVGREP_LOG=debug cvgrep search "query")
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CVGREP_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    match cli.command {
        Commands::Ingest {
            document,
            store,
            threshold,
            quiet,
        } => {
            commands::ingest::run(&document, store.as_deref(), threshold, quiet, format)?;
        }
        Commands::Headers {
            document,
            threshold,
            all,
        } => {
            commands::headers::run(&document, threshold, all, format)?;
        }
        Commands::Search {
            question,
            store,
            top_k,
        } => {
            commands::search::run(&question, store.as_deref(), top_k, format)?;
        }
        Commands::Ask {
            document,
            question,
            top_k,
            store,
        } => {
            commands::ask::run(&document, &question, top_k, store.as_deref(), format)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "cvgrep", &mut std::io::stdout());
        }
    }

    Ok(())
}
