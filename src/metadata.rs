//! Per-file metadata: name, size, content hash and embedded image attributes.

use crate::constants::HASH_BUFFER_SIZE;
use crate::error::{Result, SqueezeError};
use crate::filter::FilterConfig;
use image::ImageReader;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

/// Metadata for one file, produced fresh by every extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Base name of the file
    pub name: String,
    /// Size in bytes; always taken from the stat call
    pub size: u64,
    /// Lowercase hex MD5 digest, present only when hashing was requested
    pub md5: Option<String>,
    /// Embedded attributes, present only when requested
    pub meta: Option<BTreeMap<String, String>>,
}

/// Source of embedded image attributes.
pub trait MetaReader {
    fn read(&self, path: &Path) -> Result<BTreeMap<String, String>>;
}

/// Reads nothing. Embedded metadata is not extracted yet; this reader always
/// succeeds with an empty mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetaReader;

impl MetaReader for NoopMetaReader {
    fn read(&self, _path: &Path) -> Result<BTreeMap<String, String>> {
        Ok(BTreeMap::new())
    }
}

/// Probes the image header for dimensions and format without decoding pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageMetaReader;

impl MetaReader for ImageMetaReader {
    fn read(&self, path: &Path) -> Result<BTreeMap<String, String>> {
        let reader = ImageReader::open(path)
            .map_err(|e| SqueezeError::from_io(path, e))?
            .with_guessed_format()?;

        let mut meta = BTreeMap::new();
        if let Some(format) = reader.format() {
            meta.insert("format".to_string(), format!("{:?}", format).to_lowercase());
        }
        // Unreadable headers leave the mapping without dimensions.
        match reader.into_dimensions() {
            Ok((width, height)) => {
                meta.insert("width".to_string(), width.to_string());
                meta.insert("height".to_string(), height.to_string());
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "image header unreadable");
            }
        }
        Ok(meta)
    }
}

/// Builds [`FileRecord`]s with a pluggable [`MetaReader`].
pub struct MetadataExtractor {
    meta_reader: Box<dyn MetaReader>,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(Box::new(NoopMetaReader))
    }
}

impl MetadataExtractor {
    pub fn new(meta_reader: Box<dyn MetaReader>) -> Self {
        Self { meta_reader }
    }

    /// Stats `path` and fills the fields `config` asks for.
    ///
    /// Fails with `NotFound` when the path does not exist and `Io` on any
    /// other stat or read failure. A read error while hashing fails the whole
    /// extraction.
    pub fn extract(&self, path: &Path, config: &FilterConfig) -> Result<FileRecord> {
        let stat = fs::metadata(path).map_err(|e| SqueezeError::from_io(path, e))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        let md5 = if config.compute_hash {
            Some(content_hash(path)?)
        } else {
            None
        };

        let meta = if config.compute_meta {
            Some(self.meta_reader.read(path)?)
        } else {
            None
        };

        Ok(FileRecord {
            name,
            size: stat.len(),
            md5,
            meta,
        })
    }
}

/// Extracts a record with the default (empty) metadata reader.
pub fn extract_file_record(path: &Path, config: &FilterConfig) -> Result<FileRecord> {
    MetadataExtractor::default().extract(path, config)
}

/// Streams the file through MD5 and returns the lowercase hex digest.
pub fn content_hash(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| SqueezeError::from_io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut context = md5::Context::new();

    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(data).unwrap();
        path
    }

    fn all_fields() -> FilterConfig {
        FilterConfig {
            exclude_hidden: true,
            compute_size: true,
            compute_hash: true,
            compute_meta: true,
        }
    }

    #[test]
    fn test_content_hash_known_value() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "hello.txt", b"hello world");
        assert_eq!(
            content_hash(&path).unwrap(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn test_content_hash_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.png", b"");
        assert_eq!(
            content_hash(&path).unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn test_extract_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "photo.jpg", &[7u8; 2048]);

        let record = extract_file_record(&path, &all_fields()).unwrap();
        assert_eq!(record.name, "photo.jpg");
        assert_eq!(record.size, 2048);
        assert_eq!(record.md5.as_deref().map(str::len), Some(32));
        assert_eq!(record.meta, Some(BTreeMap::new()));
    }

    #[test]
    fn test_unset_flags_leave_fields_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "photo.png", b"png bytes");
        let config = FilterConfig {
            exclude_hidden: false,
            compute_size: false,
            compute_hash: false,
            compute_meta: false,
        };

        let record = extract_file_record(&path, &config).unwrap();
        assert_eq!(record.md5, None);
        assert_eq!(record.meta, None);
        // Size comes from the stat call regardless of the flag.
        assert_eq!(record.size, 9);
    }

    #[test]
    fn test_extract_twice_is_stable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "same.png", b"unchanging content");

        let first = extract_file_record(&path, &all_fields()).unwrap();
        let second = extract_file_record(&path, &all_fields()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = extract_file_record(Path::new("/nonexistent/file.jpg"), &all_fields());
        assert!(matches!(result, Err(SqueezeError::NotFound(_))));
    }

    #[test]
    fn test_custom_meta_reader_is_used() {
        struct Fixed;
        impl MetaReader for Fixed {
            fn read(&self, _path: &Path) -> Result<BTreeMap<String, String>> {
                Ok(BTreeMap::from([("camera".to_string(), "x100".to_string())]))
            }
        }

        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.jpg", b"data");
        let extractor = MetadataExtractor::new(Box::new(Fixed));

        let record = extractor.extract(&path, &all_fields()).unwrap();
        assert_eq!(
            record.meta.unwrap().get("camera").map(String::as_str),
            Some("x100")
        );
    }

    #[test]
    fn test_image_meta_reader_reads_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbImage::new(3, 2).save(&path).unwrap();

        let meta = ImageMetaReader.read(&path).unwrap();
        assert_eq!(meta.get("width").map(String::as_str), Some("3"));
        assert_eq!(meta.get("height").map(String::as_str), Some("2"));
        assert_eq!(meta.get("format").map(String::as_str), Some("png"));
    }

    #[test]
    fn test_image_meta_reader_tolerates_bad_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not really a png").unwrap();

        let meta = ImageMetaReader.read(&path).unwrap();
        assert!(meta.get("width").is_none());
        assert!(meta.get("height").is_none());
    }
}
