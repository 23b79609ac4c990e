// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search command - k-nearest-chunk retrieval from the persisted store

use anyhow::{bail, Result};

use crate::cli::OutputFormat;
use cvgrep::config::Config;
use cvgrep::embedding::create_provider;
use cvgrep::output::{colorize_rank, colorize_score, use_colors};
use cvgrep::rag::Retriever;
use cvgrep::store::{SearchHit, VectorStore};

/// Run the search command
pub fn run(
    question: &str,
    store: Option<&str>,
    top_k: Option<usize>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let config = Config::load();
    let format = super::resolve_format(format, &config);

    let store_dir = super::resolve_store_dir(store)?;

    let store = VectorStore::open(&store_dir, config.embeddings().dimension())?;
    if store.is_empty() {
        bail!(
            "Vector store at {} is empty; run `cvgrep ingest <resume>` first",
            store_dir.display()
        );
    }

    let mut provider = create_provider(config.embeddings())?;
    let mut retriever = Retriever::new(provider.as_mut(), &store);

    let k = top_k.unwrap_or_else(|| config.answer().top_k());
    let hits = retriever.query(question, k)?;

    print_hits(&hits, format)?;
    Ok(())
}

/// Prints ranked hits, mirrored by the ask command's retrieval section.
pub fn print_hits(hits: &[SearchHit], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(hits)?);
        }
        OutputFormat::Text => {
            let use_color = use_colors();
            for (rank, hit) in hits.iter().enumerate() {
                println!(
                    "\n{} (distance: {})",
                    colorize_rank(&format!("[{}]", rank + 1), use_color),
                    colorize_score(&format!("{:.4}", hit.distance), use_color)
                );
                println!("{}", hit.chunk);
            }
        }
    }
    Ok(())
}
