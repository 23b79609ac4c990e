// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document loading and heuristic header-candidate flagging.
//!
//! cvgrep consumes extracted text, not source documents: PDFs and scans are
//! expected to be run through an OCR/text-extraction step beforehand. This
//! module reads the resulting plain-text file and flags the lines that look
//! like section headers (mostly-uppercase, short) so the classifier has a
//! candidate set to start from.

use anyhow::{Context, Result};
use std::path::Path;

use crate::errors::DocumentError;

/// Uppercase-character ratio above which a short line is flagged.
const UPPER_RATIO_CUTOFF: f64 = 0.6;

/// Candidate lines must have fewer words than this.
const MAX_CANDIDATE_WORDS: usize = 6;

/// A line flagged as a possible section header.
#[derive(Debug, Clone)]
pub struct CandidateLine {
    /// Position of the line in the document.
    pub line_index: usize,
    /// The line text as read.
    pub text: String,
}

/// A document ready for the segmentation pipeline.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Full text, `\n`-delimited lines.
    pub text: String,
    /// Heuristically flagged header candidates, in document order.
    pub header_candidates: Vec<CandidateLine>,
}

/// Reads a plain-text resume and flags header candidates.
///
/// An empty or whitespace-only document is an error; there is nothing to
/// segment or index.
pub fn read_document(path: impl AsRef<Path>) -> Result<ExtractedDocument> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;

    if text.trim().is_empty() {
        return Err(DocumentError::EmptyDocument(path.to_path_buf()).into());
    }

    let header_candidates = flag_candidates(&text);
    Ok(ExtractedDocument {
        text,
        header_candidates,
    })
}

/// Flags mostly-uppercase short lines as header candidates.
pub fn flag_candidates(text: &str) -> Vec<CandidateLine> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| looks_like_header(line))
        .map(|(line_index, line)| CandidateLine {
            line_index,
            text: line.to_string(),
        })
        .collect()
}

fn looks_like_header(line: &str) -> bool {
    let char_count = line.chars().count().max(1);
    let upper_count = line.chars().filter(|c| c.is_uppercase()).count();
    let upper_ratio = upper_count as f64 / char_count as f64;

    upper_ratio > UPPER_RATIO_CUTOFF && line.split_whitespace().count() < MAX_CANDIDATE_WORDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn uppercase_short_lines_are_flagged() {
        let text = "John Doe\nEDUCATION\nBachelor of Arts in Marketing\nWORK EXPERIENCE\nXYZ Corp, 2019 to 2021, marketing intern";
        let candidates = flag_candidates(text);

        let flagged: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(flagged, vec!["EDUCATION", "WORK EXPERIENCE"]);
        assert_eq!(candidates[0].line_index, 1);
        assert_eq!(candidates[1].line_index, 3);
    }

    #[test]
    fn long_uppercase_lines_are_not_flagged() {
        let text = "THIS WHOLE LINE IS SHOUTING ABOUT MANY THINGS AT ONCE";
        assert!(flag_candidates(text).is_empty());
    }

    #[test]
    fn lowercase_headers_are_not_flagged() {
        // Normal-case headers rely on the classifier's full-text scan.
        assert!(flag_candidates("Education\nSLU").is_empty());
    }

    #[test]
    fn reading_an_empty_document_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "  \n\n  ").unwrap();

        let err = read_document(&path).unwrap_err();
        assert!(err.downcast_ref::<DocumentError>().is_some());
    }

    #[test]
    fn reading_a_missing_document_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_document(dir.path().join("nope.txt")).is_err());
    }

    #[test]
    fn read_document_returns_text_and_candidates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        fs::write(
            &path,
            "EDUCATION\nSoutheastern Louisiana University\nSKILLS\nPython and SQL",
        )
        .unwrap();

        let doc = read_document(&path).unwrap();
        assert!(doc.text.starts_with("EDUCATION"));
        assert_eq!(doc.header_candidates.len(), 2);
    }
}
