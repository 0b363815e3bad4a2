/// File kind classification
///
/// A kind decides by extension alone whether a path belongs to it. Kinds are
/// trait objects so the filter and the pipeline work with any kind a caller
/// registers, not only the built-in JPEG and PNG ones.
use crate::error::{Result, SqueezeError};
use std::fmt;
use std::path::Path;

/// A classification of files by extension.
///
/// Implementations must be pure functions of the path string: no filesystem
/// access, and no case normalization of the extension.
pub trait FileKind: Send + Sync {
    /// Returns `true` if `path` belongs to this kind
    fn matches(&self, path: &Path) -> bool;

    /// Short human-readable label, e.g. `"JPG"`
    fn label(&self) -> &str;
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// JPEG images: `.jpg` and `.jpeg`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Jpeg;

impl FileKind for Jpeg {
    fn matches(&self, path: &Path) -> bool {
        matches!(extension_of(path), Some("jpg" | "jpeg"))
    }

    fn label(&self) -> &str {
        "JPG"
    }
}

/// PNG images: `.png`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Png;

impl FileKind for Png {
    fn matches(&self, path: &Path) -> bool {
        extension_of(path) == Some("png")
    }

    fn label(&self) -> &str {
        "PNG"
    }
}

/// Kind matching an arbitrary set of extensions.
///
/// Programmatic extension point: register it on a [`KindRegistry`] to add a
/// kind without writing a new type. Config `kinds` only selects registered ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionKind {
    label: String,
    extensions: Vec<String>,
}

impl ExtensionKind {
    pub fn new(label: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            label: label.into(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl FileKind for ExtensionKind {
    fn matches(&self, path: &Path) -> bool {
        extension_of(path)
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for dyn FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileKind({})", self.label())
    }
}

/// Maps kind identifiers (`"jpeg"`, `"png"`, ...) to kind objects.
///
/// Iteration follows registration order, which is also the order in which
/// the pipeline processes kinds.
pub struct KindRegistry {
    entries: Vec<(String, Box<dyn FileKind>)>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("jpeg", Jpeg);
        registry.register("png", Png);
        registry
    }
}

impl KindRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the kind registered under `id`.
    pub fn register(&mut self, id: &str, kind: impl FileKind + 'static) {
        let id = id.to_lowercase();
        let kind: Box<dyn FileKind> = Box::new(kind);
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = kind,
            None => self.entries.push((id, kind)),
        }
    }

    /// Looks up a kind by identifier; `jpg` is accepted as an alias of `jpeg`.
    pub fn get(&self, id: &str) -> Result<&dyn FileKind> {
        let id = match id.to_lowercase().as_str() {
            "jpg" => "jpeg".to_string(),
            other => other.to_string(),
        };
        self.entries
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, kind)| kind.as_ref())
            .ok_or(SqueezeError::UnknownKind(id))
    }

    /// Resolves a list of identifiers, preserving the requested order.
    pub fn select(&self, ids: &[String]) -> Result<Vec<&dyn FileKind>> {
        ids.iter().map(|id| self.get(id)).collect()
    }

    /// Returns the first registered kind that matches `path`.
    pub fn classify(&self, path: &Path) -> Option<&dyn FileKind> {
        self.iter().find(|kind| kind.matches(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn FileKind> {
        self.entries.iter().map(|(_, kind)| kind.as_ref())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|(id, _)| id.as_str()).collect()
    }
}
