use std::borrow::Cow;
use std::io::BufRead;

use ragprep_chunk::{ChunkAccumulator, ChunkSink};
use ragprep_core::{Config, RedactionFilter};

use crate::error::RecordError;
use crate::extracted::tag_extracted;
use crate::normalize::RecordNormalizer;
use crate::record::{RawRecord, parse_record};

/// Counts collected while draining one input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Lines this drain was responsible for, malformed ones included.
    pub lines: usize,
    pub records: usize,
    pub skipped: usize,
    pub redacted: usize,
}

/// Normalize-then-redact, shared by the single-process splitter and every
/// partition worker.
#[derive(Debug)]
pub struct RecordPipeline {
    normalizer: RecordNormalizer,
    redaction: RedactionFilter,
}

impl RecordPipeline {
    #[must_use]
    pub fn new(normalizer: RecordNormalizer, redaction: RedactionFilter) -> Self {
        Self {
            normalizer,
            redaction,
        }
    }

    /// # Errors
    ///
    /// Returns `RecordError::InvalidConfig` if the redaction triggers do not
    /// compile.
    pub fn from_config(config: &Config) -> Result<Self, RecordError> {
        let redaction = RedactionFilter::new(&config.redaction)
            .map_err(|e| RecordError::InvalidConfig(format!("redaction triggers: {e}")))?;
        Ok(Self::new(RecordNormalizer::new(&config.normalize), redaction))
    }

    #[must_use]
    pub fn normalizer(&self) -> &RecordNormalizer {
        &self.normalizer
    }

    #[must_use]
    pub fn redaction(&self) -> &RedactionFilter {
        &self.redaction
    }

    /// Final narrative for one record, and whether redaction touched it.
    #[must_use]
    pub fn narrative(&self, record: &RawRecord, source: &str) -> (String, bool) {
        let text = self.normalizer.normalize(record, source);
        self.finish_text(text)
    }

    /// Tag extracted document text by its source extension, then redact it.
    #[must_use]
    pub fn scrub(&self, text: &str, extension: &str) -> (String, bool) {
        let tagged = tag_extracted(text, extension).into_owned();
        self.finish_text(tagged)
    }

    fn finish_text(&self, text: String) -> (String, bool) {
        let redacted = match self.redaction.redact(&text) {
            Cow::Owned(redacted) => Some(redacted),
            Cow::Borrowed(_) => None,
        };
        match redacted {
            Some(redacted) => (redacted, true),
            None => (text, false),
        }
    }

    /// Feed every owned line of `reader` through the pipeline into `acc`.
    ///
    /// `owns` receives the 0-based line number and decides whether this drain
    /// handles the line; unowned lines are not parsed. Malformed owned lines
    /// are logged with their 1-based position and skipped. The caller still
    /// has to `finish` the accumulator.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the input fails or a chunk cannot be sealed.
    pub fn drain<R, S, F>(
        &self,
        reader: R,
        source: &str,
        owns: F,
        acc: &mut ChunkAccumulator<S>,
    ) -> Result<DrainStats, RecordError>
    where
        R: BufRead,
        S: ChunkSink,
        F: Fn(usize) -> bool,
    {
        let mut stats = DrainStats::default();
        for (line_no, line) in reader.split(b'\n').enumerate() {
            let line = line.map_err(|source| RecordError::Read {
                line: line_no + 1,
                source,
            })?;
            if !owns(line_no) {
                continue;
            }
            stats.lines += 1;

            let record = match parse_record(&line) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(source, line = line_no + 1, error = %e, "skipping malformed record");
                    stats.skipped += 1;
                    continue;
                }
            };

            let (narrative, redacted) = self.narrative(&record, source);
            if redacted {
                stats.redacted += 1;
            }
            acc.append(narrative)?;
            stats.records += 1;
        }
        Ok(stats)
    }
}

impl Default for RecordPipeline {
    fn default() -> Self {
        Self::new(RecordNormalizer::default(), RedactionFilter::default())
    }
}
