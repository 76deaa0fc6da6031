use std::path::{Path, PathBuf};

use crate::NARRATIVE_SEPARATOR;
use crate::error::ChunkError;
use crate::types::Chunk;

/// Destination for sealed chunks.
///
/// `index` is the accumulator's sequential chunk number, starting at 0.
/// Implementations must not keep partial state on error: the accumulator
/// leaves the chunk buffered when `seal` fails.
pub trait ChunkSink {
    /// # Errors
    ///
    /// Returns an error if the chunk cannot be persisted.
    fn seal(&mut self, index: usize, chunk: &Chunk) -> Result<(), ChunkError>;
}

impl<S: ChunkSink + ?Sized> ChunkSink for &mut S {
    fn seal(&mut self, index: usize, chunk: &Chunk) -> Result<(), ChunkError> {
        (**self).seal(index, chunk)
    }
}

/// Zero-padded artifact file name. Five digits keep lexicographic order equal
/// to emission order up to 100 000 chunks.
#[must_use]
pub fn artifact_name(base: &str, index: usize) -> String {
    format!("{base}_part_{index:05}.txt")
}

/// Writes each sealed chunk to `{dir}/{base}_part_{index:05}.txt`.
///
/// Existing files are overwritten, so re-running over the same input
/// reproduces the same artifacts.
#[derive(Debug)]
pub struct DirSink {
    dir: PathBuf,
    base: String,
    written: Vec<PathBuf>,
}

impl DirSink {
    /// Create the output directory (and parents) and return a sink writing into it.
    ///
    /// # Errors
    ///
    /// Returns `ChunkError::CreateDir` if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>, base: impl Into<String>) -> Result<Self, ChunkError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| ChunkError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            base: base.into(),
            written: Vec::new(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in emission order.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ChunkSink for DirSink {
    fn seal(&mut self, index: usize, chunk: &Chunk) -> Result<(), ChunkError> {
        let path = self.dir.join(artifact_name(&self.base, index));
        std::fs::write(&path, chunk.render(NARRATIVE_SEPARATOR)).map_err(|source| {
            ChunkError::Write {
                index,
                path: path.clone(),
                source,
            }
        })?;
        tracing::info!(
            path = %path.display(),
            narratives = chunk.len(),
            bytes = chunk.byte_size(),
            "chunk written"
        );
        self.written.push(path);
        Ok(())
    }
}

/// Keeps sealed chunks in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub chunks: Vec<Chunk>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All narratives across all sealed chunks, in emission order.
    #[must_use]
    pub fn narratives(&self) -> Vec<&str> {
        self.chunks
            .iter()
            .flat_map(|c| c.narratives().iter().map(String::as_str))
            .collect()
    }
}

impl ChunkSink for MemorySink {
    fn seal(&mut self, _index: usize, chunk: &Chunk) -> Result<(), ChunkError> {
        self.chunks.push(chunk.clone());
        Ok(())
    }
}
