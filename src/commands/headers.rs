// SPDX-License-Identifier: MIT OR Apache-2.0

//! Headers command - diagnostic listing of detected section headers

use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use cvgrep::config::Config;
use cvgrep::embedding::create_provider;
use cvgrep::extract;
use cvgrep::headers::{Confidence, HeaderClassifier};
use cvgrep::output::{colorize_confidence, colorize_header, colorize_score, use_colors};

/// Run the headers command
pub fn run(
    document: &str,
    threshold: Option<f32>,
    all: bool,
    format: Option<OutputFormat>,
) -> Result<()> {
    let mut config = Config::load();
    if let Some(threshold) = threshold {
        config.headers.threshold = Some(threshold);
    }
    let format = super::resolve_format(format, &config);

    let doc = extract::read_document(Path::new(document))?;

    let mut provider = create_provider(config.embeddings())?;
    let mut classifier = HeaderClassifier::new(provider.as_mut(), config.headers().threshold())?;
    let candidates = classifier.detect_headers(&doc.text)?;

    let shown: Vec<_> = candidates
        .into_iter()
        .filter(|c| all || c.confidence == Confidence::High)
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        OutputFormat::Text => {
            if shown.is_empty() {
                println!("No section headers detected in {}", document);
                return Ok(());
            }

            let use_color = use_colors();
            println!("Found {} section headers:", shown.len());
            for candidate in &shown {
                println!(
                    "Line {}: {}",
                    candidate.line_index,
                    colorize_header(&candidate.original_text, use_color)
                );
                println!(
                    "  Confidence: {}",
                    colorize_confidence(&candidate.confidence.to_string(), use_color)
                );
                println!(
                    "  Similarity: {}",
                    colorize_score(&format!("{:.3}", candidate.similarity_score), use_color)
                );
                println!("  Best match: {}", candidate.matched_reference);
            }
        }
    }

    Ok(())
}
