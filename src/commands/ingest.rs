// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingest command - segment, embed, and index one resume document

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::cli::OutputFormat;
use cvgrep::config::Config;
use cvgrep::embedding::{create_provider, embed_chunk, EmbeddingProvider};
use cvgrep::errors::DocumentError;
use cvgrep::extract;
use cvgrep::headers::{confirmed_headers, HeaderClassifier};
use cvgrep::output::{colorize_header, use_colors};
use cvgrep::segmenter::segment;
use cvgrep::store::VectorStore;

/// Result of pushing one document through the ingest pipeline.
#[derive(Debug, Serialize)]
pub struct IngestOutcome {
    /// High-confidence header lines that bounded the chunks.
    pub confirmed_headers: Vec<String>,
    /// Chunks embedded and appended to the store.
    pub chunks_added: usize,
    /// Chunks dropped because they cleaned to nothing.
    pub chunks_skipped: usize,
    /// Store record count after the append.
    pub store_records: usize,
}

/// Runs extract → classify → segment → embed → append → persist for one
/// document against the store at `store_dir`.
///
/// Heuristically flagged candidate lines are classified first; when none of
/// them confirms, every line of the document is scanned as a fallback so
/// normal-case headers still match the catalog.
pub fn ingest_document(
    document: &Path,
    store_dir: &Path,
    config: &Config,
    provider: &mut dyn EmbeddingProvider,
) -> Result<IngestOutcome> {
    let doc = extract::read_document(document)?;
    let threshold = config.headers().threshold();

    let mut classifier = HeaderClassifier::new(&mut *provider, threshold)?;
    let mut candidates = Vec::new();
    for line in &doc.header_candidates {
        if let Some(candidate) = classifier.classify_line(line.line_index, &line.text)? {
            candidates.push(candidate);
        }
    }

    let mut confirmed = confirmed_headers(&candidates);
    if confirmed.is_empty() {
        debug!("no heuristic candidate confirmed; scanning every line");
        let scanned = classifier.detect_headers(&doc.text)?;
        confirmed = confirmed_headers(&scanned);
    }
    drop(classifier);

    if confirmed.is_empty() {
        return Err(DocumentError::NoHeaders(document.to_path_buf()).into());
    }

    let chunks = segment(&doc.text, &confirmed);
    if let Some(first) = chunks.first() {
        if first.start > 0 {
            debug!(bytes = first.start, "dropping text before the first header");
        }
    }

    let mut vectors = Vec::new();
    let mut kept = Vec::new();
    let mut skipped = 0usize;
    for chunk in &chunks {
        let vector = embed_chunk(&mut *provider, &chunk.text)?;
        if vector.is_empty() {
            skipped += 1;
            continue;
        }
        vectors.push(vector);
        kept.push(chunk.text.clone());
    }

    let mut store = VectorStore::open(store_dir, config.embeddings().dimension())?;
    store.add(&vectors, &kept)?;
    store.persist()?;

    info!(
        document = %document.display(),
        headers = confirmed.len(),
        chunks = kept.len(),
        skipped,
        "ingested document"
    );

    Ok(IngestOutcome {
        confirmed_headers: confirmed,
        chunks_added: kept.len(),
        chunks_skipped: skipped,
        store_records: store.len(),
    })
}

/// Run the ingest command
pub fn run(
    document: &str,
    store: Option<&str>,
    threshold: Option<f32>,
    quiet: bool,
    format: Option<OutputFormat>,
) -> Result<()> {
    let mut config = Config::load();
    if let Some(threshold) = threshold {
        config.headers.threshold = Some(threshold);
    }
    let format = super::resolve_format(format, &config);

    let store_dir = super::resolve_store_dir(store)?;

    let mut provider = create_provider(config.embeddings())?;
    let outcome = ingest_document(Path::new(document), &store_dir, &config, provider.as_mut())?;

    if outcome.chunks_added == 0 {
        bail!(
            "No chunks could be embedded from {}; nothing was added to the store",
            document
        );
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Text => {
            if !quiet {
                let use_color = use_colors();
                println!(
                    "Detected {} section headers: {}",
                    outcome.confirmed_headers.len(),
                    outcome
                        .confirmed_headers
                        .iter()
                        .map(|h| colorize_header(h, use_color))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                println!(
                    "Indexed {} chunks ({} skipped); store at {} now holds {} records",
                    outcome.chunks_added,
                    outcome.chunks_skipped,
                    store_dir.display(),
                    outcome.store_records
                );
            }
        }
    }

    Ok(())
}
