/*!
Error types for the gzdist core engine.
*/

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type used throughout the gzdist core.
pub type Result<T> = std::result::Result<T, GzdistError>;

/// Errors that can occur while mirroring a directory into gzip artifacts.
#[derive(Error, Debug)]
pub enum GzdistError {
    /// Source directory is missing or is not a directory
    #[error("`{}` directory does not exist", .path.display())]
    NotFound { path: PathBuf },

    /// Traversal of the source directory found no files
    #[error("`{}` directory is empty", .path.display())]
    EmptyInput { path: PathBuf },

    /// I/O errors on a specific path
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failures (permissions, symlink loops)
    #[error("Failed to walk {}: {message}", .path.display())]
    Walk { path: PathBuf, message: String },

    /// Compression/decompression errors
    #[error("Compression error: {0}")]
    Compression(String),

    /// Storage adapter errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl GzdistError {
    /// Create a new I/O error tied to the path that failed
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a new traversal error
    pub fn walk<P: AsRef<Path>>(path: P, err: walkdir::Error) -> Self {
        Self::Walk {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Create a new compression error
    pub fn compression<S: Into<String>>(msg: S) -> Self {
        Self::Compression(msg.into())
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
}
