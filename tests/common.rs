#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn write_file(path: &Path, data: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(data).unwrap();
    path.to_path_buf()
}

/// A small asset tree:
///
/// ```text
/// logo.png
/// photo.jpg
/// .hidden.png
/// notes.txt
/// nested/banner.jpeg
/// nested/icon.png
/// compressed/old.png
/// ```
pub fn create_asset_tree(root: &Path) -> Vec<PathBuf> {
    vec![
        write_file(&root.join("logo.png"), b"fake png data"),
        write_file(&root.join("photo.jpg"), &[0xFF; 2048]),
        write_file(&root.join(".hidden.png"), b"hidden png"),
        write_file(&root.join("notes.txt"), b"not an image"),
        write_file(&root.join("nested/banner.jpeg"), b"fake jpeg data"),
        write_file(&root.join("nested/icon.png"), b"icon"),
        write_file(&root.join("compressed/old.png"), b"already shrunk"),
    ]
}
