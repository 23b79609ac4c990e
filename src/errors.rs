// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed errors shared across the pipeline.
//!
//! Contract breaches and persistence failures get their own variants so
//! callers can tell a caller bug apart from a damaged store; everything else
//! flows through `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the vector store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A vector's length does not match the store dimension.
    #[error("vector length {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// `add` was called with differing vector and chunk counts.
    #[error("vector/chunk count mismatch: {vectors} vectors, {chunks} chunks")]
    CountMismatch { vectors: usize, chunks: usize },

    /// One persisted artifact exists without its pair.
    #[error("incomplete vector store at {dir}: found {present} without {missing}")]
    TornStore {
        dir: PathBuf,
        present: &'static str,
        missing: &'static str,
    },

    /// Persisted artifacts disagree on record count.
    #[error("corrupt vector store at {dir}: index holds {index_records} records, metadata holds {meta_records}")]
    RecordCountMismatch {
        dir: PathBuf,
        index_records: usize,
        meta_records: usize,
    },

    /// A persisted artifact is present but unreadable.
    #[error("failed to read {artifact}: {reason}")]
    CorruptArtifact {
        artifact: PathBuf,
        reason: String,
    },
}

/// Errors raised while preparing a document for ingestion.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document contained no text after whitespace trimming.
    #[error("document {0} is empty")]
    EmptyDocument(PathBuf),

    /// No confirmed section header was found in the document.
    #[error("no section headers detected in {0}")]
    NoHeaders(PathBuf),
}
