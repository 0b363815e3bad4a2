//! Discovery -> filter per kind -> metadata report -> compression.

use crate::batch::{compress_batch, BatchFailure, Compressor};
use crate::config::Config;
use crate::discovery::collect_files;
use crate::error::Result;
use crate::filter::filter_files;
use crate::kinds::KindRegistry;
use crate::metadata::{FileRecord, MetadataExtractor};
use crate::constants::SUCCESS_PREFIX;
use crate::report::print_records;
use std::path::{Path, PathBuf};

/// Files of one kind, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindGroup {
    pub label: String,
    pub files: Vec<PathBuf>,
}

/// What a compression pass produced before it finished or stopped.
#[derive(Debug, Default)]
pub struct CompressionSummary {
    pub groups: Vec<KindGroup>,
    pub failure: Option<BatchFailure>,
}

impl CompressionSummary {
    pub fn compressed_count(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }
}

pub struct Pipeline {
    config: Config,
    kinds: KindRegistry,
    extractor: MetadataExtractor,
}

impl Pipeline {
    pub fn new(config: Config, kinds: KindRegistry, extractor: MetadataExtractor) -> Self {
        Self {
            config,
            kinds,
            extractor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discovers files under `input` once and splits them by the configured kinds.
    ///
    /// Files inside the configured output directory are dropped as well, so a
    /// custom `output_dir` is never fed back into the next run.
    pub fn scan(&self, input: &str) -> Result<Vec<KindGroup>> {
        let mut files = collect_files(input)?;
        crate::verbose!("Discovered {} files under {}", files.len(), input);

        if let Ok(output_dir) = self.config.compression.output_dir.canonicalize() {
            files.retain(|path| !is_inside(path, &output_dir));
        }

        let kinds = self.kinds.select(&self.config.kinds)?;
        Ok(kinds
            .into_iter()
            .map(|kind| KindGroup {
                label: kind.label().to_string(),
                files: filter_files(&files, kind, &self.config.filter),
            })
            .collect())
    }

    pub fn records(&self, files: &[PathBuf]) -> Result<Vec<FileRecord>> {
        files
            .iter()
            .map(|path| self.extractor.extract(path, &self.config.filter))
            .collect()
    }

    /// Prints one table per group.
    pub fn report(&self, groups: &[KindGroup]) -> Result<()> {
        for group in groups {
            let records = self.records(&group.files)?;
            print_records(
                &format!("{} files:", group.label),
                &records,
                &self.config.filter,
            );
        }
        Ok(())
    }

    /// Prints one table per compressed group and returns how many were printed.
    ///
    /// A group whose outputs cannot be read is skipped with a warning.
    pub fn report_compressed(&self, summary: &CompressionSummary) -> usize {
        let mut printed = 0;
        for group in summary.groups.iter().filter(|g| !g.files.is_empty()) {
            match self.records(&group.files) {
                Ok(records) => {
                    print_records(
                        &format!("{} {} compressed:", SUCCESS_PREFIX, group.label),
                        &records,
                        &self.config.filter,
                    );
                    printed += 1;
                }
                Err(e) => {
                    crate::warn!("Cannot summarise {} output: {}", group.label, e);
                }
            }
        }
        printed
    }

    /// Compresses the groups in order; the first failure stops every remaining group.
    pub fn compress(&self, groups: &[KindGroup], compressor: &dyn Compressor) -> CompressionSummary {
        let compression = &self.config.compression;
        if compression.auto_upload {
            crate::warn!("auto_upload is set, but uploading to a remote store is not supported; skipping");
        }
        if !compression.keep_original {
            crate::warn!("keep_original = false is not supported; originals are left in place");
        }

        let mut summary = CompressionSummary::default();
        for group in groups {
            if group.files.is_empty() {
                continue;
            }
            crate::info!("🗜️  Compressing {} {} files...", group.files.len(), group.label);

            let outcome = compress_batch(&group.files, &self.extractor, compressor);
            summary.groups.push(KindGroup {
                label: group.label.clone(),
                files: outcome.succeeded,
            });
            if outcome.failure.is_some() {
                summary.failure = outcome.failure;
                break;
            }
        }
        summary
    }
}

fn is_inside(path: &Path, dir: &Path) -> bool {
    path.canonicalize()
        .map(|p| p.starts_with(dir))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqueezeError;
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct CountingCompressor {
        calls: Cell<usize>,
        fail_on: Option<usize>,
    }

    impl Compressor for CountingCompressor {
        fn compress(&self, path: &Path, _record: &FileRecord) -> Result<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            if Some(self.calls.get()) == self.fail_on {
                return Err(SqueezeError::remote("Too many requests"));
            }
            Ok(PathBuf::from("compressed").join(path.file_name().unwrap()))
        }
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("img")).unwrap();
        fs::create_dir_all(root.join("compressed")).unwrap();
        fs::write(root.join("img/a.jpg"), b"a").unwrap();
        fs::write(root.join("img/b.png"), b"b").unwrap();
        fs::write(root.join("img/c.jpeg"), b"c").unwrap();
        fs::write(root.join("img/.d.png"), b"d").unwrap();
        fs::write(root.join("compressed/e.png"), b"e").unwrap();
        fs::write(root.join("notes.txt"), b"f").unwrap();
        dir
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(
            Config::default(),
            KindRegistry::default(),
            MetadataExtractor::default(),
        )
    }

    fn names(group: &KindGroup) -> Vec<String> {
        group
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_scan_groups_by_kind() {
        let dir = tree();
        // The temp dir itself must not contain the output marker.
        let root = dir.path().to_string_lossy().into_owned();
        let groups = pipeline().scan(&root).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "JPG");
        assert_eq!(names(&groups[0]), vec!["a.jpg", "c.jpeg"]);
        assert_eq!(groups[1].label, "PNG");
        assert_eq!(names(&groups[1]), vec!["b.png"]);
    }

    #[test]
    fn test_records_follow_filter_config() {
        let dir = tree();
        let records = pipeline()
            .records(&[dir.path().join("img/a.jpg")])
            .unwrap();
        assert_eq!(records[0].size, 1);
        assert!(records[0].md5.is_some());
        assert!(records[0].meta.is_none());
    }

    #[test]
    fn test_compress_all_groups() {
        let dir = tree();
        let pipeline = pipeline();
        let groups = pipeline.scan(&dir.path().to_string_lossy()).unwrap();
        let compressor = CountingCompressor {
            calls: Cell::new(0),
            fail_on: None,
        };

        let summary = pipeline.compress(&groups, &compressor);
        assert!(summary.failure.is_none());
        assert_eq!(summary.compressed_count(), 3);
    }

    #[test]
    fn test_failure_stops_later_groups() {
        let dir = tree();
        let pipeline = pipeline();
        let groups = pipeline.scan(&dir.path().to_string_lossy()).unwrap();
        let compressor = CountingCompressor {
            calls: Cell::new(0),
            fail_on: Some(2),
        };

        let summary = pipeline.compress(&groups, &compressor);
        assert_eq!(compressor.calls.get(), 2);
        assert_eq!(summary.compressed_count(), 1);
        assert_eq!(summary.groups.len(), 1);
        assert!(summary.failure.is_some());
    }

    #[test]
    fn test_scan_skips_custom_output_dir() {
        let dir = tree();
        fs::create_dir_all(dir.path().join("out")).unwrap();
        fs::write(dir.path().join("out/b.png"), b"shrunk").unwrap();

        let mut config = Config::default();
        config.compression.output_dir = dir.path().join("out");
        let pipeline = Pipeline::new(config, KindRegistry::default(), MetadataExtractor::default());

        let groups = pipeline.scan(&dir.path().to_string_lossy()).unwrap();
        assert_eq!(groups[1].files, vec![dir.path().join("img/b.png")]);
    }

    #[test]
    fn test_missing_output_dir_excludes_nothing() {
        let dir = tree();
        let mut config = Config::default();
        config.compression.output_dir = dir.path().join("not-yet-created");
        let pipeline = Pipeline::new(config, KindRegistry::default(), MetadataExtractor::default());

        let groups = pipeline.scan(&dir.path().to_string_lossy()).unwrap();
        assert_eq!(names(&groups[1]), vec!["b.png"]);
    }

    #[test]
    fn test_report_compressed_skips_unreadable_outputs() {
        let dir = tree();
        let summary = CompressionSummary {
            groups: vec![
                KindGroup {
                    label: "JPG".to_string(),
                    files: vec![dir.path().join("img/a.jpg")],
                },
                KindGroup {
                    label: "PNG".to_string(),
                    files: vec![dir.path().join("gone/b.png")],
                },
            ],
            failure: None,
        };

        assert_eq!(pipeline().report_compressed(&summary), 1);
    }
}
