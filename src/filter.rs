use crate::constants::COMPRESSED_MARKER;
use crate::kinds::FileKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Options shared by every filter pass and metadata extraction in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Drop files whose base name starts with `.`
    pub exclude_hidden: bool,
    /// Show file sizes in reports
    pub compute_size: bool,
    /// Compute an MD5 digest of file contents
    pub compute_hash: bool,
    /// Read embedded image metadata
    pub compute_meta: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_hidden: true,
            compute_size: true,
            compute_hash: true,
            compute_meta: false,
        }
    }
}

impl FilterConfig {
    /// The field set the compression orchestrator extracts: size and hash only.
    pub fn for_compression() -> Self {
        Self {
            exclude_hidden: false,
            compute_size: true,
            compute_hash: true,
            compute_meta: false,
        }
    }
}

pub fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

pub fn is_compressed_output(path: &Path) -> bool {
    path.to_string_lossy().contains(COMPRESSED_MARKER)
}

/// Reduces `paths` to the ones belonging to `kind`.
///
/// Pure: no filesystem access. Input order is preserved and a path that
/// appears more than once is kept only at its first position.
pub fn filter_files(paths: &[PathBuf], kind: &dyn FileKind, config: &FilterConfig) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut filtered = Vec::new();

    for path in paths {
        if config.exclude_hidden && is_hidden_file(path) {
            continue;
        }
        if is_compressed_output(path) {
            continue;
        }
        if !kind.matches(path) {
            continue;
        }
        if seen.insert(path.as_path()) {
            filtered.push(path.clone());
        }
    }

    tracing::debug!(
        kind = kind.label(),
        input = paths.len(),
        kept = filtered.len(),
        "filtered files"
    );
    filtered
}
