// SPDX-License-Identifier: MIT OR Apache-2.0

//! Header-bounded chunking of resume text.
//!
//! Confirmed header lines carve the document into ordered, non-overlapping
//! sections. Each chunk runs from its header to the next header's first
//! occurrence (or end of text), so concatenated spans cover everything from
//! the first header onward. Text before the first header is dropped.

use tracing::debug;

/// A contiguous slice of the document bounded by two header positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte offset where the chunk starts (its header's position).
    pub start: usize,
    /// Byte offset one past the chunk's last byte.
    pub end: usize,
    /// The spanned text, trimmed of surrounding whitespace.
    pub text: String,
}

/// Splits `text` into chunks bounded by the confirmed headers.
///
/// Algorithm:
/// ```text
/// for each header: locate its first occurrence (case-insensitive)
/// drop headers that do not occur; dedupe repeated positions
/// sort positions ascending
/// chunk i spans position(i) .. position(i+1), the last to end-of-text
/// ```
///
/// Headers may arrive in any order; sorting by first occurrence restores
/// document order. Zero located headers yields zero chunks.
pub fn segment(text: &str, confirmed_headers: &[String]) -> Vec<Chunk> {
    let mut positions: Vec<usize> = confirmed_headers
        .iter()
        .filter_map(|header| find_ignore_ascii_case(text, header))
        .collect();

    positions.sort_unstable();
    positions.dedup();

    if positions.len() < confirmed_headers.len() {
        debug!(
            located = positions.len(),
            supplied = confirmed_headers.len(),
            "some headers were not found in the document text"
        );
    }

    positions
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = positions.get(i + 1).copied().unwrap_or(text.len());
            Chunk {
                start,
                end,
                text: text[start..end].trim().to_string(),
            }
        })
        .collect()
}

/// Finds the first occurrence of `needle` in `haystack`, folding ASCII case.
///
/// Returns a byte offset. Matches always begin and end on character
/// boundaries: continuation bytes can never equal a needle's leading byte
/// under ASCII case folding.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
