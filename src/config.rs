// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for cvgrep
//!
//! Loads configuration from .cvgreprc.toml in the working directory or
//! ~/.config/cvgrep/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::headers::DEFAULT_THRESHOLD;
use crate::rag::DEFAULT_TOP_K;
use crate::store::DEFAULT_EMBEDDING_DIM;

/// Output format for results (mirrored from cli for library use)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOutputFormat {
    #[default]
    Text,
    Json,
}

/// Embedding provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    #[default]
    Builtin,
    Command,
    Dummy,
}

/// Embedding configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider type (builtin, command, dummy)
    pub provider: Option<EmbeddingProviderType>,
    /// Model identifier for the embedding provider
    pub model: Option<String>,
    /// Command to execute for the command provider
    pub command: Option<String>,
    /// Embedding dimension (dummy provider and new stores)
    pub dimension: Option<usize>,
}

impl EmbeddingConfig {
    /// Get provider type (defaults to Builtin)
    pub fn provider(&self) -> EmbeddingProviderType {
        self.provider.unwrap_or_default()
    }

    /// Get model identifier (defaults to "all-MiniLM-L6-v2")
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("all-MiniLM-L6-v2")
    }

    /// Get command (defaults to "embedder")
    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or("embedder")
    }

    /// Get embedding dimension (defaults to 384)
    pub fn dimension(&self) -> usize {
        self.dimension.unwrap_or(DEFAULT_EMBEDDING_DIM)
    }
}

/// Header detection configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HeadersConfig {
    /// Minimum similarity for a line to count as a header
    pub threshold: Option<f32>,
}

impl HeadersConfig {
    /// Get detection threshold (defaults to 0.6)
    pub fn threshold(&self) -> f32 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }
}

/// Vector store configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the persisted index and chunk list
    pub dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Get the store directory name (defaults to ".cvgrep")
    pub fn dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::utils::STORE_DIR))
    }
}

/// Answer generation configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Command to execute for answer generation
    pub command: Option<String>,
    /// Model identifier passed through to the command
    pub model: Option<String>,
    /// Default number of chunks to retrieve
    pub top_k: Option<usize>,
}

impl AnswerConfig {
    /// Get the answer command, if configured
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Get model identifier (defaults to "default")
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("default")
    }

    /// Get retrieval depth (defaults to 3)
    pub fn top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }
}

/// Configuration loaded from .cvgreprc.toml or ~/.config/cvgrep/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format (text or json)
    pub default_format: Option<ConfigOutputFormat>,

    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,

    /// Header detection configuration
    #[serde(default)]
    pub headers: HeadersConfig,

    /// Vector store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Answer generation configuration
    #[serde(default)]
    pub answer: AnswerConfig,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .cvgreprc.toml in current directory
    /// 2. ~/.config/cvgrep/config.toml
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_for_dir(&cwd)
    }

    /// Load configuration, looking for .cvgreprc.toml in `dir` first.
    pub fn load_for_dir(dir: &Path) -> Self {
        if let Some(config) = Self::load_from_path(&dir.join(".cvgreprc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("cvgrep").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get the embedding configuration
    pub fn embeddings(&self) -> &EmbeddingConfig {
        &self.embeddings
    }

    /// Get the header detection configuration
    pub fn headers(&self) -> &HeadersConfig {
        &self.headers
    }

    /// Get the store configuration
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    /// Get the answer generation configuration
    pub fn answer(&self) -> &AnswerConfig {
        &self.answer
    }
}
