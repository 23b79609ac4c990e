// SPDX-License-Identifier: MIT OR Apache-2.0

//! Utility functions for cvgrep

use std::path::{Path, PathBuf};

/// The name of the vector store directory
pub const STORE_DIR: &str = ".cvgrep";

/// Result of finding a store root
#[derive(Debug)]
pub struct StoreRoot {
    /// The directory containing the .cvgrep folder
    pub root: PathBuf,
    /// The full path to the .cvgrep folder
    pub store_path: PathBuf,
    /// Whether this is the current directory or a parent
    pub is_parent: bool,
}

/// Find the nearest .cvgrep store directory by walking up from the given path.
/// Returns None if no .cvgrep directory is found.
pub fn find_store_root(start: impl AsRef<Path>) -> Option<StoreRoot> {
    let mut current = start.as_ref().to_path_buf();

    // Canonicalize to handle relative paths
    if let Ok(canonical) = current.canonicalize() {
        current = canonical;
    }

    let original = current.clone();

    loop {
        let store_path = current.join(STORE_DIR);
        if store_path.exists() && store_path.is_dir() {
            return Some(StoreRoot {
                root: current.clone(),
                store_path,
                is_parent: current != original,
            });
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Get the store path for the given directory, walking up to find parent
/// stores. Falls back to `<path>/.cvgrep` if no store is found anywhere.
pub fn get_store_path(path: impl AsRef<Path>) -> PathBuf {
    match find_store_root(&path) {
        Some(root) => root.store_path,
        None => path.as_ref().join(STORE_DIR),
    }
}
