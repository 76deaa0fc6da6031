use std::path::{Path, PathBuf};
use std::sync::Arc;

use ragprep_chunk::ChunkSummary;
use tokio::task::JoinSet;

use crate::error::RecordError;
use crate::pipeline::RecordPipeline;
use crate::split::{SplitReport, artifact_base, split_path};

/// One of `count` disjoint slices of the input: line `n` belongs to shard
/// `n % count`.
///
/// Only built by [`Shard::all`] and [`PartitionCoordinator::shard`], so
/// `count` is never zero and `id < count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shard {
    id: usize,
    count: usize,
}

impl Shard {
    /// All shards of a `count`-way partition, in id order. Empty for zero.
    pub fn all(count: usize) -> impl Iterator<Item = Self> {
        (0..count).map(move |id| Self { id, count })
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn owns(&self, line_no: usize) -> bool {
        line_no % self.count == self.id
    }

    /// `{base}_shard_{id:03}`, so shard artifacts never collide.
    #[must_use]
    pub fn artifact_base(&self, base: &str) -> String {
        format!("{base}_shard_{:03}", self.id)
    }
}

/// Shard count that yields roughly one artifact per shard:
/// `max(1, ceil(input_bytes / max_chunk_bytes))`.
#[must_use]
pub fn suggested_shard_count(input_bytes: u64, max_chunk_bytes: usize) -> usize {
    let ceiling = u64::try_from(max_chunk_bytes.max(1)).unwrap_or(u64::MAX);
    usize::try_from(input_bytes.div_ceil(ceiling))
        .unwrap_or(usize::MAX)
        .max(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardReport {
    pub shard: Shard,
    pub split: SplitReport,
}

/// Per-shard reports, ordered by shard id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionReport {
    pub shards: Vec<ShardReport>,
}

impl PartitionReport {
    #[must_use]
    pub fn records(&self) -> usize {
        self.shards.iter().map(|s| s.split.records).sum()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.shards.iter().map(|s| s.split.skipped).sum()
    }

    #[must_use]
    pub fn redacted(&self) -> usize {
        self.shards.iter().map(|s| s.split.redacted).sum()
    }

    #[must_use]
    pub fn chunks(&self) -> ChunkSummary {
        let mut total = ChunkSummary::default();
        for shard in &self.shards {
            total.merge(shard.split.chunks);
        }
        total
    }

    /// Every artifact written, shard by shard.
    pub fn artifacts(&self) -> impl Iterator<Item = &Path> {
        self.shards
            .iter()
            .flat_map(|s| s.split.artifacts.iter().map(PathBuf::as_path))
    }
}

/// Runs the record pipeline over `shards` disjoint slices of one input.
///
/// Each worker opens the input on its own, parses only the lines its shard
/// owns and feeds a private accumulator. Nothing is shared between workers
/// except the read-only pipeline, so the byte ceiling holds per shard and
/// artifact indices are only ordered within a shard.
#[derive(Debug, Clone)]
pub struct PartitionCoordinator {
    pipeline: Arc<RecordPipeline>,
    shards: usize,
    max_chunk_bytes: usize,
}

impl PartitionCoordinator {
    /// # Errors
    ///
    /// Returns `RecordError::ZeroShards` if `shards` is zero.
    pub fn new(
        pipeline: Arc<RecordPipeline>,
        shards: usize,
        max_chunk_bytes: usize,
    ) -> Result<Self, RecordError> {
        if shards == 0 {
            return Err(RecordError::ZeroShards);
        }
        Ok(Self {
            pipeline,
            shards,
            max_chunk_bytes,
        })
    }

    #[must_use]
    pub fn shards(&self) -> usize {
        self.shards
    }

    #[must_use]
    pub fn shard(&self, id: usize) -> Option<Shard> {
        (id < self.shards).then_some(Shard {
            id,
            count: self.shards,
        })
    }

    /// Process a single shard synchronously. Re-running a shard overwrites
    /// exactly the artifacts it produced before.
    ///
    /// # Errors
    ///
    /// Fails on the same conditions as a single-process split.
    pub fn run_shard(
        &self,
        shard: Shard,
        input: &Path,
        out_dir: &Path,
    ) -> Result<SplitReport, RecordError> {
        self.run_shard_as(shard, input, out_dir, &artifact_base(input))
    }

    /// [`run_shard`](Self::run_shard) with an explicit artifact base; the
    /// shard writes `{base}_shard_{id:03}_part_{index:05}.txt`.
    ///
    /// # Errors
    ///
    /// Same as [`run_shard`](Self::run_shard).
    pub fn run_shard_as(
        &self,
        shard: Shard,
        input: &Path,
        out_dir: &Path,
        base: &str,
    ) -> Result<SplitReport, RecordError> {
        split_path(
            &self.pipeline,
            self.max_chunk_bytes,
            input,
            out_dir,
            &shard.artifact_base(base),
            |line_no| shard.owns(line_no),
        )
    }

    /// Run every shard on the blocking pool and wait for all of them.
    ///
    /// A failing shard does not cancel the others; once all have finished the
    /// first failure is returned and the successful shards' artifacts remain.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::ShardFailed` or `RecordError::Join` if any
    /// worker failed.
    pub async fn run(&self, input: &Path, out_dir: &Path) -> Result<PartitionReport, RecordError> {
        self.run_as(input, out_dir, &artifact_base(input)).await
    }

    /// [`run`](Self::run) with an explicit artifact base shared by all shards.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub async fn run_as(
        &self,
        input: &Path,
        out_dir: &Path,
        base: &str,
    ) -> Result<PartitionReport, RecordError> {
        tracing::info!(
            input = %input.display(),
            shards = self.shards,
            max_chunk_bytes = self.max_chunk_bytes,
            "partition started"
        );

        let mut join_set = JoinSet::new();
        for shard in Shard::all(self.shards) {
            let coordinator = self.clone();
            let input = input.to_path_buf();
            let out_dir = out_dir.to_path_buf();
            let base = base.to_owned();
            join_set.spawn_blocking(move || {
                let result = coordinator.run_shard_as(shard, &input, &out_dir, &base);
                (shard, result)
            });
        }

        let mut shards = Vec::with_capacity(self.shards);
        let mut failure = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((shard, Ok(split))) => {
                    tracing::debug!(
                        shard = shard.id,
                        records = split.records,
                        chunks = split.chunks.chunks,
                        "shard finished"
                    );
                    shards.push(ShardReport { shard, split });
                }
                Ok((shard, Err(e))) => {
                    tracing::error!(shard = shard.id, error = %e, "shard failed");
                    if failure.is_none() {
                        failure = Some(RecordError::ShardFailed {
                            shard: shard.id,
                            source: Box::new(e),
                        });
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "shard task panicked or was cancelled");
                    if failure.is_none() {
                        failure = Some(RecordError::Join(e));
                    }
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        shards.sort_by_key(|s| s.shard.id);
        let report = PartitionReport { shards };
        tracing::info!(
            records = report.records(),
            skipped = report.skipped(),
            chunks = report.chunks().chunks,
            "partition finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fmt::Write as _;

    use super::*;

    fn coordinator(shards: usize, max: usize) -> PartitionCoordinator {
        PartitionCoordinator::new(Arc::new(RecordPipeline::default()), shards, max).unwrap()
    }

    fn input_with(dir: &Path, lines: usize) -> PathBuf {
        let mut body = String::new();
        for i in 0..lines {
            if i == 7 {
                body.push_str("{ broken\n");
            } else {
                writeln!(body, "{{\"seq\": {i}, \"note\": \"entry {i}\"}}").unwrap();
            }
        }
        let path = dir.join("events.jsonl");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn narratives_in(paths: impl Iterator<Item = PathBuf>) -> Vec<String> {
        paths
            .flat_map(|p| {
                std::fs::read_to_string(p)
                    .unwrap()
                    .split("\n\n---\n\n")
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn every_line_owned_by_exactly_one_shard() {
        for count in 1..8 {
            for line in 0..100 {
                let owners = Shard::all(count).filter(|s| s.owns(line)).count();
                assert_eq!(owners, 1, "line {line} with {count} shards");
            }
        }
    }

    #[test]
    fn shard_artifact_base() {
        let shard = coordinator(12, 100).shard(7).unwrap();
        assert_eq!((shard.id(), shard.count()), (7, 12));
        assert_eq!(shard.artifact_base("events"), "events_shard_007");
    }

    #[test]
    fn zero_way_partition_has_no_shards() {
        assert_eq!(Shard::all(0).count(), 0);
        for shard in Shard::all(3) {
            assert_eq!(shard.count(), 3);
            assert!(shard.owns(shard.id()));
        }
    }

    #[test]
    fn suggested_counts() {
        assert_eq!(suggested_shard_count(0, 100), 1);
        assert_eq!(suggested_shard_count(100, 100), 1);
        assert_eq!(suggested_shard_count(101, 100), 2);
        assert_eq!(suggested_shard_count(4_000_000_000, 40 * 1024 * 1024), 96);
        assert_eq!(suggested_shard_count(10, 0), 10);
    }

    #[test]
    fn zero_shards_rejected() {
        let result = PartitionCoordinator::new(Arc::new(RecordPipeline::default()), 0, 10);
        assert!(matches!(result, Err(RecordError::ZeroShards)));
        assert!(coordinator(3, 10).shard(3).is_none());
    }

    #[tokio::test]
    async fn shards_cover_all_valid_records_once() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_with(tmp.path(), 40);
        let out = tmp.path().join("chunks");

        let report = coordinator(4, 256).run(&input, &out).await.unwrap();
        assert_eq!(report.shards.len(), 4);
        assert_eq!(report.records(), 39);
        assert_eq!(report.skipped(), 1);
        // malformed line 7 belongs to shard 3
        assert_eq!(report.shards[3].split.skipped, 1);

        let narratives = narratives_in(report.artifacts().map(Path::to_path_buf));
        assert_eq!(narratives.len(), 39);
        let unique: BTreeSet<&String> = narratives.iter().collect();
        assert_eq!(unique.len(), 39);

        for shard in &report.shards {
            for path in &shard.split.artifacts {
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                assert!(name.starts_with(&format!("events_shard_{:03}_part_", shard.shard.id())));
            }
        }
    }

    #[tokio::test]
    async fn each_shard_respects_local_ceiling() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_with(tmp.path(), 60);
        let report = coordinator(3, 200).run(&input, tmp.path()).await.unwrap();
        for path in report.artifacts() {
            let text = std::fs::read_to_string(path).unwrap();
            let bytes: usize = text.split("\n\n---\n\n").map(str::len).sum();
            assert!(bytes <= 200);
        }
    }

    #[tokio::test]
    async fn shard_narratives_keep_input_order() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_with(tmp.path(), 30);
        let report = coordinator(2, 10_000).run(&input, tmp.path()).await.unwrap();
        let first = narratives_in(report.shards[0].split.artifacts.iter().cloned());
        let expected: Vec<String> = (0..30)
            .step_by(2)
            .map(|i| format!("SOURCE FILE: events.jsonl. The Seq is: {i}. The Note is: entry {i}."))
            .collect();
        assert_eq!(first, expected);
    }

    #[tokio::test]
    async fn retried_shard_reproduces_its_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_with(tmp.path(), 50);
        let out = tmp.path().join("chunks");
        let coordinator = coordinator(5, 150);
        let report = coordinator.run(&input, &out).await.unwrap();

        let shard = coordinator.shard(2).unwrap();
        let before: Vec<Vec<u8>> = report.shards[2]
            .split
            .artifacts
            .iter()
            .map(|p| std::fs::read(p).unwrap())
            .collect();
        for path in &report.shards[2].split.artifacts {
            std::fs::remove_file(path).unwrap();
        }

        let retried = coordinator.run_shard(shard, &input, &out).unwrap();
        assert_eq!(retried, report.shards[2].split);
        let after: Vec<Vec<u8>> = retried
            .artifacts
            .iter()
            .map(|p| std::fs::read(p).unwrap())
            .collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn more_shards_than_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_with(tmp.path(), 3);
        let report = coordinator(8, 1000).run(&input, tmp.path()).await.unwrap();
        assert_eq!(report.shards.len(), 8);
        assert_eq!(report.records(), 3);
        assert_eq!(report.chunks().chunks, 3);
        assert!(report.shards[5].split.artifacts.is_empty());
    }

    #[tokio::test]
    async fn explicit_base_names_every_shard() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_with(tmp.path(), 10);
        let report = coordinator(2, 10_000)
            .run_as(&input, tmp.path(), "b_events")
            .await
            .unwrap();
        let names: Vec<PathBuf> = report.artifacts().map(Path::to_path_buf).collect();
        assert_eq!(
            names,
            [
                tmp.path().join("b_events_shard_000_part_00000.txt"),
                tmp.path().join("b_events_shard_001_part_00000.txt"),
            ]
        );
    }

    #[tokio::test]
    async fn missing_input_fails_run() {
        let tmp = tempfile::tempdir().unwrap();
        let err = coordinator(2, 100)
            .run(&tmp.path().join("absent.jsonl"), tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::ShardFailed { .. }));
    }
}
