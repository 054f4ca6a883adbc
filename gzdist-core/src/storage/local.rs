/*!
Local filesystem storage adapter implementation.
*/

use super::StorageAdapter;
use crate::{GzdistError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Local filesystem storage adapter
///
/// Writes artifacts under a destination root, creating parent directories
/// as needed so the output mirrors the source tree.
///
/// # Example
/// ```rust
/// use gzdist_core::storage::{LocalFileStorage, StorageAdapter};
/// use std::path::Path;
///
/// # let tmp = std::env::temp_dir().join("gzdist-doc-local");
/// let storage = LocalFileStorage::with_base_dir(&tmp);
/// storage.reset()?;
/// let written = storage.save(b"compressed bytes", Path::new("assets/app.js.gz"))?;
/// assert_eq!(written, tmp.join("assets/app.js.gz"));
/// # Ok::<(), gzdist_core::GzdistError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
}

impl LocalFileStorage {
    /// Create a storage adapter rooted at `base_dir`
    ///
    /// # Arguments
    /// * `base_dir` - The destination directory for all artifacts
    pub fn with_base_dir<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolve the full path for a given storage path
    fn resolve_path(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Ensure the parent directory exists, creating it if necessary
    fn ensure_parent_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| GzdistError::io(parent, e))?;
            }
        }
        Ok(())
    }
}

impl StorageAdapter for LocalFileStorage {
    fn reset(&self) -> Result<()> {
        match fs::symlink_metadata(&self.base_dir) {
            Ok(meta) => {
                let removed = if meta.is_dir() {
                    fs::remove_dir_all(&self.base_dir)
                } else {
                    fs::remove_file(&self.base_dir)
                };
                removed.map_err(|e| GzdistError::io(&self.base_dir, e))?;
                info!(
                    destination = %self.base_dir.display(),
                    "Removed previous destination contents"
                );
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(GzdistError::io(&self.base_dir, e)),
        }

        fs::create_dir_all(&self.base_dir).map_err(|e| GzdistError::io(&self.base_dir, e))?;
        debug!(destination = %self.base_dir.display(), "Destination directory ready");
        Ok(())
    }

    fn save(&self, data: &[u8], path: &Path) -> Result<PathBuf> {
        let full_path = self.resolve_path(path);

        self.ensure_parent_dir(&full_path)?;

        fs::write(&full_path, data).map_err(|e| GzdistError::io(&full_path, e))?;

        Ok(full_path)
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        let full_path = self.resolve_path(path);

        fs::read(&full_path).map_err(|e| GzdistError::io(&full_path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve_path(path).is_file()
    }

    fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.base_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut stored = Vec::new();
        for entry in WalkDir::new(&self.base_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| GzdistError::walk(&self.base_dir, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.base_dir).map_err(|_| {
                GzdistError::storage(format!(
                    "{} escaped the destination root",
                    entry.path().display()
                ))
            })?;
            stored.push(relative.to_path_buf());
        }
        Ok(stored)
    }
}
