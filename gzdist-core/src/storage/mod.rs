/*!
Storage adapters for compressed artifacts.

This module defines the destination abstraction (port) and its filesystem
implementation (adapter). The engine only decides *what* to write and *where*
relative to the destination root; the adapter owns the root itself.
*/

pub mod local;

use crate::Result;
use std::path::{Path, PathBuf};

/// Storage abstraction for the destination tree
///
/// Paths handed to an adapter are relative to its root unless they are
/// absolute, in which case they are used as-is.
pub trait StorageAdapter {
    /// Remove every stored artifact and recreate an empty root
    ///
    /// Missing roots are not an error.
    fn reset(&self) -> Result<()>;

    /// Save artifact data to the specified location
    ///
    /// # Arguments
    /// * `data` - The compressed bytes to save
    /// * `path` - Destination of the artifact
    ///
    /// # Returns
    /// The fully resolved path that was written
    fn save(&self, data: &[u8], path: &Path) -> Result<PathBuf>;

    /// Load artifact data from the specified location
    fn load(&self, path: &Path) -> Result<Vec<u8>>;

    /// Check if an artifact exists at the specified location
    fn exists(&self, path: &Path) -> bool;

    /// List every stored artifact, relative to the root
    fn list(&self) -> Result<Vec<PathBuf>>;
}

// Re-export types for convenience
pub use local::LocalFileStorage;

/// Memory-based storage adapter for testing
///
/// Stores artifacts in a map keyed by relative path. Useful for unit testing
/// the engine without touching the destination filesystem.
#[cfg(test)]
pub struct MemoryStorage {
    data: std::sync::Arc<std::sync::Mutex<std::collections::BTreeMap<PathBuf, Vec<u8>>>>,
}

#[cfg(test)]
impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            data: std::sync::Arc::new(std::sync::Mutex::new(std::collections::BTreeMap::new())),
        }
    }

    /// Insert an artifact directly, bypassing the engine
    pub fn insert<P: Into<PathBuf>>(&self, path: P, data: &[u8]) {
        self.data.lock().unwrap().insert(path.into(), data.to_vec());
    }
}

#[cfg(test)]
impl StorageAdapter for MemoryStorage {
    fn reset(&self) -> Result<()> {
        self.data.lock().unwrap().clear();
        Ok(())
    }

    fn save(&self, data: &[u8], path: &Path) -> Result<PathBuf> {
        let mut storage = self.data.lock().unwrap();
        storage.insert(path.to_path_buf(), data.to_vec());
        Ok(path.to_path_buf())
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        let storage = self.data.lock().unwrap();
        storage.get(path).cloned().ok_or_else(|| {
            crate::GzdistError::storage(format!("Artifact not found: {}", path.display()))
        })
    }

    fn exists(&self, path: &Path) -> bool {
        let storage = self.data.lock().unwrap();
        storage.contains_key(path)
    }

    fn list(&self) -> Result<Vec<PathBuf>> {
        let storage = self.data.lock().unwrap();
        Ok(storage.keys().cloned().collect())
    }
}
