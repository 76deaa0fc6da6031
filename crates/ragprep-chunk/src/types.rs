/// Ordered narratives plus their summed UTF-8 byte length.
///
/// The byte count excludes separators; it is what the rollover policy compares
/// against the ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    narratives: Vec<String>,
    byte_size: usize,
}

impl Chunk {
    pub(crate) fn push(&mut self, narrative: String) {
        self.byte_size = self.byte_size.saturating_add(narrative.len());
        self.narratives.push(narrative);
    }

    #[must_use]
    pub fn narratives(&self) -> &[String] {
        &self.narratives
    }

    #[must_use]
    pub fn into_narratives(self) -> Vec<String> {
        self.narratives
    }

    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.narratives.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.narratives.is_empty()
    }

    /// Artifact body: narratives joined by `separator`.
    #[must_use]
    pub fn render(&self, separator: &str) -> String {
        self.narratives.join(separator)
    }
}

/// Totals for everything an accumulator sealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkSummary {
    pub chunks: usize,
    pub narratives: usize,
    pub bytes: usize,
}

impl ChunkSummary {
    pub fn merge(&mut self, other: ChunkSummary) {
        self.chunks += other.chunks;
        self.narratives += other.narratives;
        self.bytes += other.bytes;
    }
}
