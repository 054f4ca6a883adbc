//! Configuration for a compression run
//!
//! The source and destination directories are passed explicitly into the
//! engine instead of being read from globals, so tests can point a run at
//! temporary directories.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default source directory, relative to the working directory
pub const DEFAULT_SOURCE_DIR: &str = "dist";

/// Default destination directory, relative to the working directory
pub const DEFAULT_DESTINATION_DIR: &str = "gzipped";

/// Directories used by a compression run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressConfig {
    /// Build output tree to read from
    pub source_dir: PathBuf,
    /// Tree that is wiped and rebuilt with compressed artifacts
    pub destination_dir: PathBuf,
}

impl CompressConfig {
    /// Create a configuration for the given source and destination
    pub fn new<S: Into<PathBuf>, D: Into<PathBuf>>(source_dir: S, destination_dir: D) -> Self {
        Self {
            source_dir: source_dir.into(),
            destination_dir: destination_dir.into(),
        }
    }

    /// Validate the configuration
    ///
    /// The destination is deleted at the start of every run, so it may never
    /// be the source, contain the source, or live inside it.
    pub fn validate(&self) -> crate::Result<()> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(crate::GzdistError::validation(
                "source directory must not be empty",
            ));
        }
        if self.destination_dir.as_os_str().is_empty() {
            return Err(crate::GzdistError::validation(
                "destination directory must not be empty",
            ));
        }

        let source = normalize(&self.source_dir);
        let destination = normalize(&self.destination_dir);

        if source == destination {
            return Err(crate::GzdistError::validation(format!(
                "source and destination are the same directory: {}",
                self.source_dir.display()
            )));
        }
        if source.starts_with(&destination) {
            return Err(crate::GzdistError::validation(format!(
                "destination {} contains the source {}",
                self.destination_dir.display(),
                self.source_dir.display()
            )));
        }
        if destination.starts_with(&source) {
            return Err(crate::GzdistError::validation(format!(
                "destination {} is inside the source {}",
                self.destination_dir.display(),
                self.source_dir.display()
            )));
        }
        Ok(())
    }
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_DIR, DEFAULT_DESTINATION_DIR)
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..` where possible.
/// Relative paths are anchored to the working directory when it is known.
fn normalize(path: &Path) -> PathBuf {
    let anchored = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in anchored.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
