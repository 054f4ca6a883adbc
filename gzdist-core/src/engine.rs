/*!
Engine that mirrors a source tree into compressed artifacts.

A run is strictly linear: validate source, reset destination, enumerate
files, compress each one, summarize. The first failure aborts the run and
whatever was already written stays in place.
*/

use crate::{
    compression::CompressionAdapter,
    config::CompressConfig,
    storage::{LocalFileStorage, StorageAdapter},
    walker, GzdistError, GzipCompressor, Result,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One source file and the artifact produced from it
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    /// Source file as discovered by the walk
    pub source: PathBuf,
    /// Resolved artifact path that was written
    pub destination: PathBuf,
    /// Size of the source file in bytes
    pub input_bytes: u64,
    /// Size of the compressed artifact in bytes
    pub output_bytes: u64,
}

/// Outcome of a successful run
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub files: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub artifacts: Vec<ArtifactRecord>,
}

impl RunSummary {
    fn new(config: &CompressConfig) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            destination_dir: config.destination_dir.clone(),
            files: 0,
            input_bytes: 0,
            output_bytes: 0,
            artifacts: Vec::new(),
        }
    }

    fn record(&mut self, artifact: ArtifactRecord) {
        self.files += 1;
        self.input_bytes += artifact.input_bytes;
        self.output_bytes += artifact.output_bytes;
        self.artifacts.push(artifact);
    }

    /// Compressed size divided by original size, `None` when every input was empty
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.input_bytes == 0 {
            None
        } else {
            Some(self.output_bytes as f64 / self.input_bytes as f64)
        }
    }
}

/// Verification state of a single source file
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyStatus {
    /// Artifact decompresses to the source bytes
    Ok,
    /// No artifact exists for the source file
    Missing,
    /// Artifact could not be decompressed
    Corrupt { reason: String },
    /// Artifact decompresses to different bytes
    Mismatch { expected: String, actual: String },
}

/// Verification result for one source file
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct VerifyEntry {
    pub source: PathBuf,
    /// Artifact path relative to the destination root
    pub artifact: PathBuf,
    #[serde(flatten)]
    pub status: VerifyStatus,
}

/// Result of checking a destination tree against its source
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub entries: Vec<VerifyEntry>,
    /// Artifacts with no source counterpart, relative to the destination root
    pub stale: Vec<PathBuf>,
}

impl VerifyReport {
    /// True when every source file has a matching artifact and nothing is stale
    pub fn is_clean(&self) -> bool {
        self.stale.is_empty()
            && self
                .entries
                .iter()
                .all(|entry| entry.status == VerifyStatus::Ok)
    }

    /// Number of entries that failed verification
    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.status != VerifyStatus::Ok)
            .count()
    }
}

/// Main engine for compression runs
///
/// Orchestrates the walker, the compression adapter and the storage adapter.
///
/// # Example
/// ```rust,no_run
/// use gzdist_core::{create_default_compressor, CompressConfig};
///
/// let compressor = create_default_compressor(CompressConfig::default());
/// let summary = compressor.run_with_progress(|artifact| {
///     println!("{} -> {}", artifact.source.display(), artifact.destination.display());
/// })?;
/// println!("{} files", summary.files);
/// # Ok::<(), gzdist_core::GzdistError>(())
/// ```
pub struct DistCompressor<S, C>
where
    S: StorageAdapter,
    C: CompressionAdapter,
{
    config: CompressConfig,
    storage: S,
    compressor: C,
}

impl<S, C> DistCompressor<S, C>
where
    S: StorageAdapter,
    C: CompressionAdapter,
{
    /// Create a new engine
    ///
    /// # Arguments
    /// * `config` - Source and destination directories
    /// * `storage` - Adapter owning the destination tree
    /// * `compressor` - Codec used for every artifact
    pub fn new(config: CompressConfig, storage: S, compressor: C) -> Self {
        Self {
            config,
            storage,
            compressor,
        }
    }

    pub fn config(&self) -> &CompressConfig {
        &self.config
    }

    /// Artifact path for a source path relative to the source root
    pub fn artifact_path(&self, relative: &Path) -> PathBuf {
        let mut name = OsString::from(relative.as_os_str());
        name.push(self.compressor.file_suffix());
        PathBuf::from(name)
    }

    /// Compress one file into one artifact
    ///
    /// Reads the whole input into memory, compresses it and hands the bytes to
    /// the storage adapter, which creates missing parent directories.
    ///
    /// # Errors
    /// * `GzdistError::Io` - if the input cannot be read or the output written
    /// * `GzdistError::Compression` - if the encoder fails
    pub fn compress_file(&self, input: &Path, output: &Path) -> Result<ArtifactRecord> {
        let data = std::fs::read(input).map_err(|e| GzdistError::io(input, e))?;
        let compressed = self.compressor.compress(&data)?;
        let destination = self.storage.save(&compressed, output)?;

        debug!(
            source = %input.display(),
            destination = %destination.display(),
            input_bytes = data.len(),
            output_bytes = compressed.len(),
            "Compressed file"
        );

        Ok(ArtifactRecord {
            source: input.to_path_buf(),
            destination,
            input_bytes: data.len() as u64,
            output_bytes: compressed.len() as u64,
        })
    }

    /// Run without progress reporting
    pub fn run(&self) -> Result<RunSummary> {
        self.run_with_progress(|_| {})
    }

    /// Run the full pipeline, reporting each artifact as soon as it is written
    ///
    /// # Errors
    /// * `GzdistError::Validation` - if the configuration is unsafe to run
    /// * `GzdistError::NotFound` - if the source directory is missing; the
    ///   destination is left untouched
    /// * `GzdistError::EmptyInput` - if the source holds no files; the
    ///   destination has already been reset and stays empty
    /// * any I/O, walk or compression error from an individual file
    pub fn run_with_progress<F>(&self, mut progress: F) -> Result<RunSummary>
    where
        F: FnMut(&ArtifactRecord),
    {
        self.config.validate()?;
        let source_dir = &self.config.source_dir;

        walker::validate_source(source_dir)?;
        info!(
            source = %source_dir.display(),
            destination = %self.config.destination_dir.display(),
            algorithm = self.compressor.algorithm_name(),
            "Starting compression run"
        );

        self.storage.reset()?;
        let files = walker::list_files(source_dir)?;

        let mut summary = RunSummary::new(&self.config);
        for file in &files {
            let relative = walker::relative_path(source_dir, file)?;
            let output = self.artifact_path(relative);
            let artifact = self.compress_file(file, &output)?;
            progress(&artifact);
            summary.record(artifact);
        }

        info!(
            files = summary.files,
            input_bytes = summary.input_bytes,
            output_bytes = summary.output_bytes,
            "Compression run finished"
        );
        Ok(summary)
    }

    /// Check the destination tree against the current source tree
    ///
    /// Every source file must have an artifact that decompresses to the same
    /// bytes, and the destination must hold nothing else. Mismatches are
    /// reported, not raised; only failures to read the source are errors.
    pub fn verify(&self) -> Result<VerifyReport> {
        let source_dir = &self.config.source_dir;
        walker::validate_source(source_dir)?;
        let files = walker::list_files(source_dir)?;

        let mut report = VerifyReport::default();
        let mut expected = BTreeSet::new();

        for file in &files {
            let relative = walker::relative_path(source_dir, file)?;
            let artifact = self.artifact_path(relative);
            let status = self.verify_artifact(file, &artifact)?;
            if status != VerifyStatus::Ok {
                warn!(source = %file.display(), ?status, "Artifact failed verification");
            }
            expected.insert(artifact.clone());
            report.entries.push(VerifyEntry {
                source: file.clone(),
                artifact,
                status,
            });
        }

        report.stale = self
            .storage
            .list()?
            .into_iter()
            .filter(|stored| !expected.contains(stored))
            .collect();

        info!(
            checked = report.entries.len(),
            failures = report.failures(),
            stale = report.stale.len(),
            "Verification finished"
        );
        Ok(report)
    }

    fn verify_artifact(&self, source: &Path, artifact: &Path) -> Result<VerifyStatus> {
        if !self.storage.exists(artifact) {
            return Ok(VerifyStatus::Missing);
        }

        let original = std::fs::read(source).map_err(|e| GzdistError::io(source, e))?;
        let stored = self.storage.load(artifact)?;
        let restored = match self.compressor.decompress(&stored) {
            Ok(restored) => restored,
            Err(e) => {
                return Ok(VerifyStatus::Corrupt {
                    reason: e.to_string(),
                })
            }
        };

        let expected = content_hash(&original);
        let actual = content_hash(&restored);
        if expected == actual {
            Ok(VerifyStatus::Ok)
        } else {
            Ok(VerifyStatus::Mismatch { expected, actual })
        }
    }
}

/// SHA-256 of `data` as lowercase hex
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Create an engine writing gzip artifacts to the configured destination
///
/// # Example
/// ```rust
/// use gzdist_core::{create_default_compressor, CompressConfig};
///
/// let compressor = create_default_compressor(CompressConfig::new("build", "build-gz"));
/// assert_eq!(compressor.config().destination_dir.to_str(), Some("build-gz"));
/// ```
pub fn create_default_compressor(
    config: CompressConfig,
) -> DistCompressor<LocalFileStorage, GzipCompressor> {
    let storage = LocalFileStorage::with_base_dir(&config.destination_dir);
    DistCompressor::new(config, storage, GzipCompressor::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::fs;
    use tempfile::TempDir;

    struct FailingCompressor;

    impl CompressionAdapter for FailingCompressor {
        fn compress(&self, _data: &[u8]) -> Result<Vec<u8>> {
            Err(GzdistError::compression("encoder exploded"))
        }

        fn decompress(&self, _compressed_data: &[u8]) -> Result<Vec<u8>> {
            Err(GzdistError::compression("decoder exploded"))
        }

        fn algorithm_name(&self) -> &str {
            "failing"
        }

        fn file_suffix(&self) -> &str {
            ".fail"
        }
    }

    fn source_tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let dist = temp_dir.path().join("dist");
        fs::create_dir_all(dist.join("assets")).unwrap();
        fs::write(dist.join("index.html"), b"<html><body>app</body></html>").unwrap();
        fs::write(dist.join("assets/app.js"), b"console.log('app');".repeat(20)).unwrap();
        temp_dir
    }

    fn memory_engine(temp_dir: &TempDir) -> DistCompressor<MemoryStorage, GzipCompressor> {
        let config = CompressConfig::new(
            temp_dir.path().join("dist"),
            temp_dir.path().join("gzipped"),
        );
        DistCompressor::new(config, MemoryStorage::new(), GzipCompressor::new())
    }

    #[test]
    fn test_artifact_path_appends_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let engine = memory_engine(&temp_dir);

        assert_eq!(
            engine.artifact_path(Path::new("assets/app.min.js")),
            PathBuf::from("assets/app.min.js.gz")
        );
    }

    #[test]
    fn test_run_reports_every_file_in_order() {
        let temp_dir = source_tree();
        let engine = memory_engine(&temp_dir);

        let mut seen = Vec::new();
        let summary = engine
            .run_with_progress(|artifact| seen.push(artifact.destination.clone()))
            .unwrap();

        assert_eq!(
            seen,
            vec![
                PathBuf::from("assets/app.js.gz"),
                PathBuf::from("index.html.gz")
            ]
        );
        assert_eq!(summary.files, 2);
        assert_eq!(summary.artifacts.len(), 2);
        assert_eq!(
            summary.input_bytes,
            summary.artifacts.iter().map(|a| a.input_bytes).sum::<u64>()
        );
    }

    #[test]
    fn test_run_output_roundtrips() {
        let temp_dir = source_tree();
        let engine = memory_engine(&temp_dir);
        engine.run().unwrap();

        let stored = engine.storage.load(Path::new("assets/app.js.gz")).unwrap();
        let restored = GzipCompressor::new().decompress(&stored).unwrap();
        assert_eq!(restored, b"console.log('app');".repeat(20));
    }

    #[test]
    fn test_run_resets_storage_first() {
        let temp_dir = source_tree();
        let engine = memory_engine(&temp_dir);
        engine.storage.insert("old/stale.js.gz", b"stale");

        engine.run().unwrap();

        assert!(!engine.storage.exists(Path::new("old/stale.js.gz")));
        assert_eq!(engine.storage.list().unwrap().len(), 2);
    }

    #[test]
    fn test_run_missing_source_does_not_touch_storage() {
        let temp_dir = TempDir::new().unwrap();
        let engine = memory_engine(&temp_dir);
        engine.storage.insert("keep.js.gz", b"previous");

        let result = engine.run();

        assert!(matches!(result, Err(GzdistError::NotFound { .. })));
        assert!(engine.storage.exists(Path::new("keep.js.gz")));
    }

    #[test]
    fn test_run_empty_source_leaves_storage_empty() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("dist/nested/deeper")).unwrap();
        let engine = memory_engine(&temp_dir);
        engine.storage.insert("keep.js.gz", b"previous");

        let result = engine.run();

        assert!(matches!(result, Err(GzdistError::EmptyInput { .. })));
        assert!(engine.storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_run_aborts_on_first_compression_failure() {
        let temp_dir = source_tree();
        let config = CompressConfig::new(
            temp_dir.path().join("dist"),
            temp_dir.path().join("gzipped"),
        );
        let engine = DistCompressor::new(config, MemoryStorage::new(), FailingCompressor);

        let mut reported = 0;
        let result = engine.run_with_progress(|_| reported += 1);

        assert!(matches!(result, Err(GzdistError::Compression(_))));
        assert_eq!(reported, 0);
        assert!(engine.storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_run_rejects_destination_inside_source() {
        let temp_dir = source_tree();
        let dist = temp_dir.path().join("dist");
        let config = CompressConfig::new(&dist, dist.join("gz"));
        let engine = DistCompressor::new(config, MemoryStorage::new(), GzipCompressor::new());

        assert!(matches!(engine.run(), Err(GzdistError::Validation(_))));
    }

    #[test]
    fn test_compress_file_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let engine = memory_engine(&temp_dir);

        let result = engine.compress_file(
            &temp_dir.path().join("missing.js"),
            Path::new("missing.js.gz"),
        );
        assert!(matches!(result, Err(GzdistError::Io { .. })));
    }

    #[test]
    fn test_compression_ratio() {
        let temp_dir = source_tree();
        let engine = memory_engine(&temp_dir);
        let summary = engine.run().unwrap();

        let ratio = summary.compression_ratio().unwrap();
        assert!(ratio > 0.0 && ratio < 1.0);

        let empty = RunSummary::new(engine.config());
        assert_eq!(empty.compression_ratio(), None);
    }

    #[test]
    fn test_verify_clean_after_run() {
        let temp_dir = source_tree();
        let engine = memory_engine(&temp_dir);
        engine.run().unwrap();

        let report = engine.verify().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.entries.len(), 2);
    }

    #[test]
    fn test_verify_flags_missing_corrupt_mismatch_and_stale() {
        let temp_dir = source_tree();
        let dist = temp_dir.path().join("dist");
        fs::write(dist.join("about.html"), b"about").unwrap();
        let engine = memory_engine(&temp_dir);
        engine.run().unwrap();

        let gzip = GzipCompressor::new();
        engine.storage.insert("about.html.gz", b"not gzip at all");
        engine
            .storage
            .insert("index.html.gz", &gzip.compress(b"tampered").unwrap());
        fs::write(dist.join("new.css"), b"p{}").unwrap();
        engine.storage.insert("ghost.js.gz", b"left over");

        let report = engine.verify().unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.failures(), 3);
        assert_eq!(report.stale, vec![PathBuf::from("ghost.js.gz")]);

        let status_of = |name: &str| {
            report
                .entries
                .iter()
                .find(|e| e.artifact == Path::new(name))
                .map(|e| e.status.clone())
                .unwrap()
        };
        assert!(matches!(status_of("about.html.gz"), VerifyStatus::Corrupt { .. }));
        assert!(matches!(status_of("index.html.gz"), VerifyStatus::Mismatch { .. }));
        assert_eq!(status_of("new.css.gz"), VerifyStatus::Missing);
        assert_eq!(status_of("assets/app.js.gz"), VerifyStatus::Ok);
    }

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
