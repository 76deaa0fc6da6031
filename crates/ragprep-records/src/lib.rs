//! Record normalization and size-bounded splitting of JSONL input.
//!
//! Each valid line becomes one narrative (`SOURCE FILE: ... The Field is: ...`),
//! passes through the redaction filter, and lands in a byte-bounded chunk.
//! [`split::JsonlSplitter`] runs this in a single thread;
//! [`partition::PartitionCoordinator`] runs it over disjoint shards in
//! parallel with no shared state.

pub mod error;
pub mod extracted;
pub mod normalize;
pub mod partition;
pub mod pipeline;
pub mod record;
pub mod split;

pub use error::RecordError;
pub use extracted::tag_extracted;
pub use normalize::{
    ExtractorRegistry, FieldExtractor, RecordNormalizer, SubSchemaExtractor, title_case,
};
pub use partition::{
    PartitionCoordinator, PartitionReport, Shard, ShardReport, suggested_shard_count,
};
pub use pipeline::{DrainStats, RecordPipeline};
pub use record::{ParseError, RawRecord, parse_record};
pub use split::{JsonlSplitter, SplitReport, artifact_base, artifact_base_within};
