use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ragprep_chunk::{ChunkAccumulator, ChunkSink, ChunkSummary, DirSink};

use crate::error::RecordError;
use crate::pipeline::RecordPipeline;

/// Outcome of splitting one input (or one shard of it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    /// Source identifier stamped into every narrative.
    pub source: String,
    pub lines: usize,
    pub records: usize,
    pub skipped: usize,
    pub redacted: usize,
    pub chunks: ChunkSummary,
    /// Artifact paths in emission order. Empty for in-memory sinks.
    pub artifacts: Vec<PathBuf>,
}

/// Single-process splitter: one reader, one accumulator, sequential artifacts.
#[derive(Debug, Clone)]
pub struct JsonlSplitter {
    pipeline: Arc<RecordPipeline>,
    max_chunk_bytes: usize,
}

impl JsonlSplitter {
    #[must_use]
    pub fn new(pipeline: Arc<RecordPipeline>, max_chunk_bytes: usize) -> Self {
        Self {
            pipeline,
            max_chunk_bytes,
        }
    }

    #[must_use]
    pub fn max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes
    }

    /// Split `input` into `{out_dir}/{stem}_part_{index:05}.txt` artifacts.
    ///
    /// # Errors
    ///
    /// Fails if the input cannot be opened or read, the output directory
    /// cannot be created, or an artifact cannot be written. Malformed lines
    /// are not errors.
    pub fn split_file(&self, input: &Path, out_dir: &Path) -> Result<SplitReport, RecordError> {
        self.split_file_as(input, out_dir, &artifact_base(input))
    }

    /// Like [`split_file`](Self::split_file) with an explicit artifact base,
    /// writing `{out_dir}/{base}_part_{index:05}.txt`.
    ///
    /// # Errors
    ///
    /// Same as [`split_file`](Self::split_file).
    pub fn split_file_as(
        &self,
        input: &Path,
        out_dir: &Path,
        base: &str,
    ) -> Result<SplitReport, RecordError> {
        split_path(&self.pipeline, self.max_chunk_bytes, input, out_dir, base, |_| true)
    }

    /// Split an already-open stream into any sink.
    ///
    /// # Errors
    ///
    /// Fails if reading fails or the sink rejects a chunk.
    pub fn split_into<R: BufRead, S: ChunkSink>(
        &self,
        reader: R,
        source: &str,
        sink: S,
    ) -> Result<SplitReport, RecordError> {
        drain_into(&self.pipeline, self.max_chunk_bytes, reader, source, sink, |_| true)
    }
}

pub(crate) fn split_path(
    pipeline: &RecordPipeline,
    max_chunk_bytes: usize,
    input: &Path,
    out_dir: &Path,
    base: &str,
    owns: impl Fn(usize) -> bool,
) -> Result<SplitReport, RecordError> {
    let source = source_name(input);
    let file = File::open(input).map_err(|e| RecordError::Open {
        path: input.to_path_buf(),
        source: e,
    })?;
    let mut sink = DirSink::create(out_dir, base)?;

    tracing::info!(input = %input.display(), out_dir = %out_dir.display(), base, "splitting started");
    let mut report = drain_into(
        pipeline,
        max_chunk_bytes,
        BufReader::new(file),
        &source,
        &mut sink,
        owns,
    )?;
    report.artifacts = sink.written().to_vec();

    tracing::info!(
        base,
        records = report.records,
        skipped = report.skipped,
        redacted = report.redacted,
        chunks = report.chunks.chunks,
        "splitting finished"
    );
    Ok(report)
}

fn drain_into<R: BufRead, S: ChunkSink>(
    pipeline: &RecordPipeline,
    max_chunk_bytes: usize,
    reader: R,
    source: &str,
    sink: S,
    owns: impl Fn(usize) -> bool,
) -> Result<SplitReport, RecordError> {
    let mut acc = ChunkAccumulator::new(sink, max_chunk_bytes)?;
    let stats = pipeline.drain(reader, source, owns, &mut acc)?;
    let chunks = acc.finish()?;
    Ok(SplitReport {
        source: source.to_owned(),
        lines: stats.lines,
        records: stats.records,
        skipped: stats.skipped,
        redacted: stats.redacted,
        chunks,
        artifacts: Vec::new(),
    })
}

/// File name used as the narrative source tag.
pub(crate) fn source_name(input: &Path) -> String {
    input.file_name().map_or_else(
        || input.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Artifact base name: the file name without a `.jsonl` extension.
#[must_use]
pub fn artifact_base(input: &Path) -> String {
    let is_jsonl = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));
    match input.file_stem() {
        Some(stem) if is_jsonl => stem.to_string_lossy().into_owned(),
        _ => source_name(input),
    }
}

/// Artifact base for an input found under `root`: the directories between
/// `root` and the file, then [`artifact_base`], joined with `_`.
///
/// `root/a/visits.jsonl` becomes `a_visits`, so same-named inputs in
/// different subdirectories get distinct artifacts. Inputs outside `root`
/// fall back to [`artifact_base`].
#[must_use]
pub fn artifact_base_within(input: &Path, root: &Path) -> String {
    let Ok(relative) = input.strip_prefix(root) else {
        return artifact_base(input);
    };
    let mut parts: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.push(artifact_base(relative));
    parts.join("_")
}
