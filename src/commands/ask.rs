// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ask command - end-to-end pipeline: ingest, retrieve, generate an answer

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;
use cvgrep::config::Config;
use cvgrep::embedding::create_provider;
use cvgrep::output::{colorize_header, use_colors};
use cvgrep::rag::{AnswerProvider, CommandAnswerer, Retriever};
use cvgrep::store::{SearchHit, VectorStore};

#[derive(Debug, Serialize)]
struct AskOutcome {
    answer: String,
    retrieved: Vec<SearchHit>,
}

/// Run the ask command
pub fn run(
    document: &str,
    question: &str,
    top_k: Option<usize>,
    store: Option<&str>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let config = Config::load();
    let format = super::resolve_format(format, &config);

    // Fail before any embedding work when no answerer is configured.
    let answer_command = match config.answer().command() {
        Some(command) => command.to_string(),
        None => bail!(
            "No answer command configured; set [answer].command in .cvgreprc.toml, \
             or use `cvgrep search` for retrieval without answer generation"
        ),
    };

    let store_dir = super::resolve_store_dir(store)?;
    let mut provider = create_provider(config.embeddings())?;

    let outcome = super::ingest::ingest_document(
        Path::new(document),
        &store_dir,
        &config,
        provider.as_mut(),
    )?;
    if outcome.store_records == 0 {
        bail!("Store at {} is empty after ingest", store_dir.display());
    }

    let store = VectorStore::open(&store_dir, config.embeddings().dimension())?;
    let mut retriever = Retriever::new(provider.as_mut(), &store);

    let k = top_k.unwrap_or_else(|| config.answer().top_k());
    let hits = retriever.query(question, k)?;

    let contexts: Vec<String> = hits.iter().map(|hit| hit.chunk.clone()).collect();
    let mut answerer = CommandAnswerer::new(answer_command, config.answer().model().to_string());
    let answer = answerer.generate(question, &contexts)?;

    match format {
        OutputFormat::Json => {
            let outcome = AskOutcome {
                answer,
                retrieved: hits,
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Text => {
            let use_color = use_colors();
            println!("{}", colorize_header("=== Answer ===", use_color));
            println!("{answer}");
            println!();
            println!("{}", colorize_header("=== Retrieved Chunks ===", use_color));
            super::search::print_hits(&hits, OutputFormat::Text)?;
        }
    }

    Ok(())
}
