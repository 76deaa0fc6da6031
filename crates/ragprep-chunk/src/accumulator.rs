use crate::error::ChunkError;
use crate::sink::ChunkSink;
use crate::types::{Chunk, ChunkSummary};

/// Buffers narratives and seals them into chunks under a byte ceiling.
///
/// Rollover policy for `append(n)`:
///
/// 1. if the buffered chunk is non-empty and `buffered + len(n) > ceiling`,
///    seal it under the next index and start an empty one;
/// 2. push `n` into the (possibly fresh) chunk.
///
/// Invariant: appending into an empty chunk always succeeds. A narrative
/// larger than the ceiling therefore ends up alone in its own chunk; it is
/// never rejected and never split. Every other sealed chunk stays at or under
/// the ceiling.
///
/// [`finish`](Self::finish) must be called at end of stream to seal the
/// trailing chunk. Dropping an accumulator that still buffers narratives logs
/// a warning, since those narratives are lost.
pub struct ChunkAccumulator<S: ChunkSink> {
    sink: S,
    max_chunk_bytes: usize,
    current: Chunk,
    next_index: usize,
    summary: ChunkSummary,
}

impl<S: ChunkSink> ChunkAccumulator<S> {
    /// # Errors
    ///
    /// Returns `ChunkError::ZeroCeiling` if `max_chunk_bytes` is zero.
    pub fn new(sink: S, max_chunk_bytes: usize) -> Result<Self, ChunkError> {
        if max_chunk_bytes == 0 {
            return Err(ChunkError::ZeroCeiling);
        }
        Ok(Self {
            sink,
            max_chunk_bytes,
            current: Chunk::default(),
            next_index: 0,
            summary: ChunkSummary::default(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if sealing the previous chunk fails. The narrative is
    /// not buffered in that case and the previous chunk stays pending.
    pub fn append(&mut self, narrative: String) -> Result<(), ChunkError> {
        let len = narrative.len();
        if !self.current.is_empty()
            && self.current.byte_size().saturating_add(len) > self.max_chunk_bytes
        {
            self.seal()?;
        }
        self.current.push(narrative);
        Ok(())
    }

    /// Seal the trailing chunk, if any, and return totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails to persist the trailing chunk.
    pub fn finish(mut self) -> Result<ChunkSummary, ChunkError> {
        if !self.current.is_empty() {
            self.seal()?;
        }
        Ok(self.summary)
    }

    #[must_use]
    pub fn max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes
    }

    /// Index the next sealed chunk will receive.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    #[must_use]
    pub fn pending(&self) -> &Chunk {
        &self.current
    }

    fn seal(&mut self) -> Result<(), ChunkError> {
        self.sink.seal(self.next_index, &self.current)?;
        let sealed = std::mem::take(&mut self.current);
        self.summary.merge(ChunkSummary {
            chunks: 1,
            narratives: sealed.len(),
            bytes: sealed.byte_size(),
        });
        self.next_index += 1;
        Ok(())
    }
}

impl<S: ChunkSink> Drop for ChunkAccumulator<S> {
    fn drop(&mut self) {
        if !self.current.is_empty() {
            tracing::warn!(
                narratives = self.current.len(),
                bytes = self.current.byte_size(),
                "chunk accumulator dropped without finish, trailing chunk lost"
            );
        }
    }
}
