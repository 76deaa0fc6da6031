use std::path::{Path, PathBuf};

use serde::Serialize;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
const DOCUMENT_EXTENSIONS: &[&str] = &["docx", "pdf", "xlsx", "pptx", "eml"];
const STRUCTURED_EXTENSION: &str = "jsonl";

/// What kind of content a file holds, judged by extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Image,
    Document,
    Structured,
    Unknown,
}

/// What the sweep does with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Moved to the quarantine directory, never ingested.
    Quarantine,
    /// Moved to the documents directory for direct ingestion.
    PassThrough,
    /// Left in place for the record splitter.
    Deferred,
    /// Left in place and logged.
    Unknown,
}

impl FileCategory {
    #[must_use]
    pub fn disposition(self) -> Disposition {
        match self {
            Self::Image => Disposition::Quarantine,
            Self::Document => Disposition::PassThrough,
            Self::Structured => Disposition::Deferred,
            Self::Unknown => Disposition::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Lower-cased extension without the dot.
    pub extension: Option<String>,
    pub category: FileCategory,
}

impl FileEntry {
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        self.category.disposition()
    }
}

/// Extension-table classifier. Lookup order: image, document, then `.jsonl`
/// under the structured root; anything else is unknown.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    structured_root: PathBuf,
}

impl FileClassifier {
    #[must_use]
    pub fn new(structured_root: impl Into<PathBuf>) -> Self {
        Self {
            structured_root: structured_root.into(),
        }
    }

    #[must_use]
    pub fn structured_root(&self) -> &Path {
        &self.structured_root
    }

    #[must_use]
    pub fn classify(&self, path: &Path) -> FileEntry {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        let category = match extension.as_deref() {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => FileCategory::Image,
            Some(ext) if DOCUMENT_EXTENSIONS.contains(&ext) => FileCategory::Document,
            Some(STRUCTURED_EXTENSION) if path.starts_with(&self.structured_root) => {
                FileCategory::Structured
            }
            _ => FileCategory::Unknown,
        };
        FileEntry {
            path: path.to_path_buf(),
            extension,
            category,
        }
    }
}
