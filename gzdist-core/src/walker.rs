/*!
Source tree validation and traversal.
*/

use crate::{GzdistError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Ensure the source path exists and is a directory
///
/// Symlinks are resolved, so a link pointing at a directory is accepted.
pub fn validate_source(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(GzdistError::NotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Recursively list every file under `root`
///
/// Directories are descended into but never returned. Entries are visited in
/// file-name order within each directory so repeated runs report files in the
/// same order. Symlinks are followed; a link cycle is reported as a walk error.
///
/// # Errors
/// * `GzdistError::Walk` - if any entry cannot be read
/// * `GzdistError::EmptyInput` - if the tree holds no files at all
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| GzdistError::walk(root, e))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(GzdistError::EmptyInput {
            path: root.to_path_buf(),
        });
    }

    debug!(root = %root.display(), files = files.len(), "Enumerated source files");
    Ok(files)
}

/// Path of `file` relative to `root`
pub fn relative_path<'a>(root: &Path, file: &'a Path) -> Result<&'a Path> {
    file.strip_prefix(root).map_err(|_| {
        GzdistError::validation(format!(
            "{} is not inside {}",
            file.display(),
            root.display()
        ))
    })
}
