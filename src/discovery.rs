use crate::error::{Result, SqueezeError};
use glob::glob;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively visits every entry under `root`.
///
/// `visit` receives each path with its directory flag; returning an error
/// stops the walk and propagates it. Entries are sorted by file name so the
/// order is stable between runs.
pub fn walk<F>(root: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(&Path, bool) -> Result<()>,
{
    if !root.exists() {
        return Err(SqueezeError::NotFound(root.to_path_buf()));
    }

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        visit(entry.path(), entry.file_type().is_dir())?;
    }
    Ok(())
}

/// Every regular file under `root`, in walk order.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, |path, is_dir| {
        if !is_dir {
            files.push(path.to_path_buf());
        }
        Ok(())
    })?;
    tracing::debug!(root = %root.display(), count = files.len(), "discovered files");
    Ok(files)
}

/// Resolves a command-line input into a flat file list.
///
/// Accepts a directory (walked recursively), a single file, or a glob
/// pattern such as `assets/**/*.png`.
pub fn collect_files(input: &str) -> Result<Vec<PathBuf>> {
    let input_path = Path::new(input);

    if input_path.is_file() {
        return Ok(vec![input_path.to_path_buf()]);
    }
    if input_path.is_dir() {
        return discover_files(input_path);
    }

    if !input.contains(['*', '?', '[']) {
        return Err(SqueezeError::NotFound(input_path.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in glob(input)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "skipping unreadable glob match"),
        }
    }
    Ok(files)
}
