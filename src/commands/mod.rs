// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command modules - one `run` entry point per subcommand

pub mod ask;
pub mod headers;
pub mod ingest;
pub mod search;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use cvgrep::config::Config;
use cvgrep::utils::get_store_path;

/// Resolves the output format: CLI flag first, then config, then text.
pub(crate) fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> OutputFormat {
    flag.or_else(|| config.default_format.map(Into::into))
        .unwrap_or(OutputFormat::Text)
}

/// Resolves the store directory: explicit flag first, else the nearest
/// `.cvgrep` directory walking up from the working directory.
pub(crate) fn resolve_store_dir(store: Option<&str>) -> Result<PathBuf> {
    Ok(match store {
        Some(dir) => Path::new(dir).to_path_buf(),
        None => get_store_path(std::env::current_dir()?),
    })
}
