use crate::error::SqueezeError;
use crate::filter::FilterConfig;
use crate::metadata::{FileRecord, MetadataExtractor};
use std::fmt;
use std::path::{Path, PathBuf};

/// Turns one source file into a compressed output file.
pub trait Compressor {
    /// Compresses `path` and returns where the result was written.
    fn compress(&self, path: &Path, record: &FileRecord) -> crate::Result<PathBuf>;
}

/// Pipeline stage at which a batch stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Metadata,
    Compress,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Metadata => write!(f, "metadata"),
            Stage::Compress => write!(f, "compress"),
        }
    }
}

/// The failure that ended a batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub stage: Stage,
    pub error: SqueezeError,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed for {:?}: {}", self.stage, self.path, self.error)
    }
}

impl std::error::Error for BatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Outputs written before the batch ended, and the failure that ended it, if any.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<PathBuf>,
    pub failure: Option<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Compresses `paths` one at a time, in order.
///
/// The first metadata or compression failure stops the batch: outputs
/// already written are kept and returned with the failure, and no later path
/// is attempted.
pub fn compress_batch(
    paths: &[PathBuf],
    extractor: &MetadataExtractor,
    compressor: &dyn Compressor,
) -> BatchOutcome {
    let config = FilterConfig::for_compression();
    let mut outcome = BatchOutcome::default();

    for path in paths {
        let record = match extractor.extract(path, &config) {
            Ok(record) => record,
            Err(error) => {
                outcome.failure = Some(BatchFailure {
                    path: path.clone(),
                    stage: Stage::Metadata,
                    error,
                });
                break;
            }
        };

        match compressor.compress(path, &record) {
            Ok(output) => {
                tracing::debug!(input = %path.display(), output = %output.display(), "compressed");
                outcome.succeeded.push(output);
            }
            Err(error) => {
                outcome.failure = Some(BatchFailure {
                    path: path.clone(),
                    stage: Stage::Compress,
                    error,
                });
                break;
            }
        }
    }

    if let Some(failure) = &outcome.failure {
        tracing::warn!(
            succeeded = outcome.succeeded.len(),
            stage = %failure.stage,
            "batch stopped early"
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    /// Records every call and fails on the configured call number (1-based).
    struct ScriptedCompressor {
        fail_on: Option<usize>,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl ScriptedCompressor {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                fail_on,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Compressor for ScriptedCompressor {
        fn compress(&self, path: &Path, record: &FileRecord) -> crate::Result<PathBuf> {
            assert!(record.md5.is_some());
            assert!(record.meta.is_none());
            self.calls.borrow_mut().push(path.to_path_buf());
            if Some(self.calls.borrow().len()) == self.fail_on {
                return Err(SqueezeError::Transport("connection reset".to_string()));
            }
            Ok(PathBuf::from("compressed").join(path.file_name().unwrap()))
        }
    }

    fn create_files(dir: &TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.path().join(format!("img{}.png", i));
                File::create(&path).unwrap().write_all(b"png").unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_all_files_succeed() {
        let dir = TempDir::new().unwrap();
        let files = create_files(&dir, 3);
        let compressor = ScriptedCompressor::new(None);

        let outcome = compress_batch(&files, &MetadataExtractor::default(), &compressor);
        assert!(outcome.is_complete());
        assert_eq!(
            outcome.succeeded,
            vec![
                PathBuf::from("compressed/img0.png"),
                PathBuf::from("compressed/img1.png"),
                PathBuf::from("compressed/img2.png"),
            ]
        );
    }

    #[test]
    fn test_fail_fast_on_kth_file() {
        let dir = TempDir::new().unwrap();
        let files = create_files(&dir, 5);
        let compressor = ScriptedCompressor::new(Some(3));

        let outcome = compress_batch(&files, &MetadataExtractor::default(), &compressor);
        assert_eq!(outcome.succeeded.len(), 2);
        assert_eq!(compressor.calls.borrow().len(), 3);

        let failure = outcome.failure.unwrap();
        assert_eq!(failure.stage, Stage::Compress);
        assert_eq!(failure.path, files[2]);
        assert!(matches!(failure.error, SqueezeError::Transport(_)));
    }

    #[test]
    fn test_metadata_failure_stops_before_compressing() {
        let dir = TempDir::new().unwrap();
        let mut files = create_files(&dir, 2);
        files.insert(1, dir.path().join("missing.png"));
        let compressor = ScriptedCompressor::new(None);

        let outcome = compress_batch(&files, &MetadataExtractor::default(), &compressor);
        assert_eq!(outcome.succeeded.len(), 1);
        assert_eq!(compressor.calls.borrow().len(), 1);

        let failure = outcome.failure.unwrap();
        assert_eq!(failure.stage, Stage::Metadata);
        assert!(matches!(failure.error, SqueezeError::NotFound(_)));
    }

    #[test]
    fn test_empty_batch() {
        let compressor = ScriptedCompressor::new(Some(1));
        let outcome = compress_batch(&[], &MetadataExtractor::default(), &compressor);
        assert!(outcome.is_complete());
        assert!(outcome.succeeded.is_empty());
    }

    #[test]
    fn test_failure_display_names_stage() {
        let failure = BatchFailure {
            path: PathBuf::from("a.png"),
            stage: Stage::Compress,
            error: SqueezeError::remote("Credentials are invalid"),
        };
        let text = failure.to_string();
        assert!(text.starts_with("compress failed"));
        assert!(text.contains("Credentials are invalid"));
    }
}
