// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent flat vector index paired with chunk-text metadata.
//!
//! The store is append-only: vectors land in a flat little-endian f32 index
//! and chunk texts in an ordered JSON list, with the i-th vector always
//! describing the i-th chunk. Search is brute-force squared-Euclidean over
//! the whole index, which is plenty for resume-sized corpora.
//!
//! Persistence uses two paired artifacts. Each is written to a temp sibling
//! and renamed into place, and loading refuses a half-present or
//! count-mismatched pair rather than treating one side as authoritative.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::StoreError;

/// Default embedding dimension for sentence-transformers/all-MiniLM-L6-v2.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// File name of the serialized vector index.
pub const INDEX_FILE: &str = "index.bin";

/// File name of the serialized chunk-text list.
pub const CHUNKS_FILE: &str = "chunks.json";

const INDEX_MAGIC: &[u8; 4] = b"CVGI";
const INDEX_VERSION: u32 = 1;
const INDEX_HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// One nearest-neighbor search hit.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SearchHit {
    /// Source text of the matching chunk.
    pub chunk: String,
    /// Squared Euclidean distance to the query; 0 means identical.
    pub distance: f32,
}

/// Flat vector index plus ordered chunk metadata, kept in lock-step.
#[derive(Debug)]
pub struct VectorStore {
    dir: PathBuf,
    dim: usize,
    data: Vec<f32>,
    chunks: Vec<String>,
}

impl VectorStore {
    /// Opens the store at `dir`, loading persisted artifacts when present.
    ///
    /// A directory with neither artifact yields an empty store of the given
    /// dimension. A directory with exactly one artifact, an unreadable
    /// artifact, or mismatched record counts is an error: a torn store must
    /// be surfaced, not silently replaced by an empty one.
    pub fn open(dir: impl AsRef<Path>, dim: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let index_path = dir.join(INDEX_FILE);
        let chunks_path = dir.join(CHUNKS_FILE);

        match (index_path.exists(), chunks_path.exists()) {
            (false, false) => Ok(Self {
                dir,
                dim,
                data: Vec::new(),
                chunks: Vec::new(),
            }),
            (true, false) => Err(StoreError::TornStore {
                dir,
                present: INDEX_FILE,
                missing: CHUNKS_FILE,
            }
            .into()),
            (false, true) => Err(StoreError::TornStore {
                dir,
                present: CHUNKS_FILE,
                missing: INDEX_FILE,
            }
            .into()),
            (true, true) => {
                let (stored_dim, data) = read_index(&index_path)?;
                let chunks = read_chunks(&chunks_path)?;

                let records = data.len() / stored_dim;
                if records != chunks.len() {
                    return Err(StoreError::RecordCountMismatch {
                        dir,
                        index_records: records,
                        meta_records: chunks.len(),
                    }
                    .into());
                }

                if stored_dim != dim {
                    debug!(
                        persisted = stored_dim,
                        requested = dim,
                        "using persisted index dimension"
                    );
                }

                Ok(Self {
                    dir,
                    dim: stored_dim,
                    data,
                    chunks,
                })
            }
        }
    }

    /// Returns the number of records in the store.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns the embedding dimension this store accepts.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the number of vectors in the index (must equal `len`).
    pub fn vector_count(&self) -> usize {
        self.data.len() / self.dim
    }

    /// Returns the directory holding the persisted artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends vectors and their chunk texts, in order, no deduplication.
    ///
    /// Every vector must be exactly `dim` long and the two slices must have
    /// equal length; either violation is a caller bug and rejects the whole
    /// batch without a partial append.
    pub fn add(&mut self, vectors: &[Vec<f32>], chunks: &[String]) -> Result<(), StoreError> {
        if vectors.len() != chunks.len() {
            return Err(StoreError::CountMismatch {
                vectors: vectors.len(),
                chunks: chunks.len(),
            });
        }
        for vector in vectors {
            if vector.len() != self.dim {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dim,
                    actual: vector.len(),
                });
            }
        }

        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        self.chunks.extend(chunks.iter().cloned());
        Ok(())
    }

    /// Writes both artifacts to disk.
    ///
    /// Each file goes to a `.tmp` sibling first and is renamed into place,
    /// so a failed write never leaves a half-written file findable under the
    /// real name.
    pub fn persist(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create store directory: {}", self.dir.display()))?;

        let index_bytes = encode_index(self.dim, &self.data);
        write_atomic(&self.dir.join(INDEX_FILE), &index_bytes)?;

        let chunks_json =
            serde_json::to_vec_pretty(&self.chunks).context("Failed to serialize chunk list")?;
        write_atomic(&self.dir.join(CHUNKS_FILE), &chunks_json)?;

        debug!(records = self.len(), dir = %self.dir.display(), "persisted vector store");
        Ok(())
    }

    /// Returns up to `k` nearest records by squared Euclidean distance,
    /// nearest first.
    ///
    /// `k == 0` or an empty store yields an empty result. Positions without
    /// matching metadata are dropped defensively; they indicate a damaged
    /// store rather than a caller bug.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, StoreError> {
        if query.len() != self.dim {
            return Err(StoreError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        if k == 0 || self.data.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(idx, vector)| (idx, squared_l2(query, vector)))
            .collect();

        // Stable sort keeps insertion order among ties, so growing k only
        // appends results.
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .filter(|(idx, _)| *idx < self.chunks.len())
            .map(|(idx, distance)| SearchHit {
                chunk: self.chunks[idx].clone(),
                distance,
            })
            .collect())
    }
}

/// Computes squared Euclidean distance between two equal-length vectors.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn encode_index(dim: usize, data: &[f32]) -> Vec<u8> {
    let records = if dim == 0 { 0 } else { data.len() / dim };
    let mut bytes = Vec::with_capacity(INDEX_HEADER_LEN + data.len() * 4);
    bytes.extend_from_slice(INDEX_MAGIC);
    bytes.extend_from_slice(&INDEX_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(dim as u32).to_le_bytes());
    bytes.extend_from_slice(&(records as u64).to_le_bytes());
    for value in data {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn read_index(path: &Path) -> Result<(usize, Vec<f32>)> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read index file: {}", path.display()))?;

    let corrupt = |reason: &str| StoreError::CorruptArtifact {
        artifact: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if bytes.len() < INDEX_HEADER_LEN {
        return Err(corrupt("file shorter than index header").into());
    }
    if &bytes[0..4] != INDEX_MAGIC {
        return Err(corrupt("bad magic bytes").into());
    }
    let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    if version != INDEX_VERSION {
        return Err(corrupt(&format!("unsupported index version {version}")).into());
    }
    let dim = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
    if dim == 0 {
        return Err(corrupt("zero dimension").into());
    }
    let records = u64::from_le_bytes(bytes[12..20].try_into().unwrap()) as usize;

    let payload = &bytes[INDEX_HEADER_LEN..];
    let expected_bytes = records
        .checked_mul(dim)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| corrupt("record count overflows"))?;
    if payload.len() != expected_bytes {
        return Err(corrupt(&format!(
            "payload holds {} bytes, header promises {}",
            payload.len(),
            expected_bytes
        ))
        .into());
    }

    let data = payload
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    Ok((dim, data))
}

fn read_chunks(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chunk list: {}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| {
        StoreError::CorruptArtifact {
            artifact: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)
        .with_context(|| format!("Failed to write temp file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}
