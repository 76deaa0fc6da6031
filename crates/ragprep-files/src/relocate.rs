use std::path::{Path, PathBuf};

use crate::error::FileError;

/// Moves a file into a destination directory, keeping its file name.
pub trait Relocator {
    /// Returns the path the file now lives at (or would, for dry runs).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be moved.
    fn relocate(&self, from: &Path, to_dir: &Path) -> Result<PathBuf, FileError>;
}

fn target(from: &Path, to_dir: &Path) -> Result<PathBuf, FileError> {
    from.file_name()
        .map(|name| to_dir.join(name))
        .ok_or_else(|| FileError::NoFileName(from.to_path_buf()))
}

/// Renames files in place on the filesystem. Both sides must be on the same
/// mount; an existing file at the target is replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRelocator;

impl Relocator for FsRelocator {
    fn relocate(&self, from: &Path, to_dir: &Path) -> Result<PathBuf, FileError> {
        let to = target(from, to_dir)?;
        std::fs::rename(from, &to).map_err(|source| FileError::Relocate {
            from: from.to_path_buf(),
            to: to.clone(),
            source,
        })?;
        Ok(to)
    }
}

/// Logs the move it would make and touches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRelocator;

impl Relocator for DryRunRelocator {
    fn relocate(&self, from: &Path, to_dir: &Path) -> Result<PathBuf, FileError> {
        let to = target(from, to_dir)?;
        tracing::info!(from = %from.display(), to = %to.display(), "dry run: would move");
        Ok(to)
    }
}
