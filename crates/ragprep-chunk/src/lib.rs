//! Size-bounded chunk accumulation for ingestion artifacts.
//!
//! Narratives are buffered into chunks whose UTF-8 byte size stays under a
//! fixed ceiling; each sealed chunk is handed to a [`ChunkSink`], which
//! usually writes it out as one numbered plain-text artifact.

pub mod accumulator;
pub mod error;
pub mod sink;
pub mod types;

pub use accumulator::ChunkAccumulator;
pub use error::ChunkError;
pub use sink::{ChunkSink, DirSink, MemorySink, artifact_name};
pub use types::{Chunk, ChunkSummary};

/// Paragraph break placed between narratives inside one artifact.
pub const NARRATIVE_SEPARATOR: &str = "\n\n---\n\n";
