use std::path::{Path, PathBuf};

use ragprep_core::config::PathsConfig;
use serde::Serialize;

use crate::classify::{Disposition, FileClassifier};
use crate::error::FileError;
use crate::relocate::Relocator;

/// Output directories under the processed root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    pub quarantine: PathBuf,
    pub documents: PathBuf,
    pub chunks: PathBuf,
}

impl Destinations {
    #[must_use]
    pub fn from_paths(paths: &PathsConfig) -> Self {
        Self {
            quarantine: paths.quarantine_dir(),
            documents: paths.documents_dir(),
            chunks: paths.chunks_dir(),
        }
    }

    /// Create all three directories.
    ///
    /// # Errors
    ///
    /// Returns `FileError::CreateDir` for the first directory that cannot be
    /// created.
    pub fn ensure(&self) -> Result<(), FileError> {
        for dir in [&self.quarantine, &self.documents, &self.chunks] {
            std::fs::create_dir_all(dir).map_err(|source| FileError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Files seen by one sweep, grouped by what happened to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// New locations of quarantined files.
    pub quarantined: Vec<PathBuf>,
    /// New locations of pass-through documents.
    pub passed_through: Vec<PathBuf>,
    /// Structured inputs left in place for splitting.
    pub deferred: Vec<PathBuf>,
    pub unknown: Vec<PathBuf>,
}

impl SweepReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.quarantined.len()
            + self.passed_through.len()
            + self.deferred.len()
            + self.unknown.len()
    }

    #[must_use]
    pub fn count(&self, disposition: Disposition) -> usize {
        match disposition {
            Disposition::Quarantine => self.quarantined.len(),
            Disposition::PassThrough => self.passed_through.len(),
            Disposition::Deferred => self.deferred.len(),
            Disposition::Unknown => self.unknown.len(),
        }
    }
}

/// Walk `root`, classify every regular file and relocate the quarantine and
/// pass-through ones.
///
/// The walk sees hidden and git-ignored files and visits directories in file
/// name order. All entries are collected before the first move, so relocated
/// files are never revisited. Unreadable directory entries are logged and
/// skipped.
///
/// # Errors
///
/// Returns `FileError::MissingRoot` if `root` is not a directory, or the
/// first relocation failure. Files relocated before the failure stay moved.
pub fn sweep(
    root: &Path,
    classifier: &FileClassifier,
    destinations: &Destinations,
    relocator: &dyn Relocator,
) -> Result<SweepReport, FileError> {
    if !root.is_dir() {
        return Err(FileError::MissingRoot(root.to_path_buf()));
    }

    let entries: Vec<_> = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
        .map(|e| classifier.classify(e.path()))
        .collect();

    tracing::info!(root = %root.display(), total = entries.len(), "sweep started");

    let mut report = SweepReport::default();
    for entry in entries {
        let path = entry.path;
        match entry.category.disposition() {
            Disposition::Quarantine => {
                let to = relocator.relocate(&path, &destinations.quarantine)?;
                tracing::info!(from = %path.display(), to = %to.display(), "quarantined");
                report.quarantined.push(to);
            }
            Disposition::PassThrough => {
                let to = relocator.relocate(&path, &destinations.documents)?;
                tracing::info!(from = %path.display(), to = %to.display(), "passed through");
                report.passed_through.push(to);
            }
            Disposition::Deferred => {
                tracing::info!(path = %path.display(), "deferred");
                report.deferred.push(path);
            }
            Disposition::Unknown => {
                tracing::warn!(path = %path.display(), "skipped unknown file type");
                report.unknown.push(path);
            }
        }
    }

    tracing::info!(
        quarantined = report.quarantined.len(),
        passed_through = report.passed_through.len(),
        deferred = report.deferred.len(),
        unknown = report.unknown.len(),
        "sweep finished"
    );
    Ok(report)
}
