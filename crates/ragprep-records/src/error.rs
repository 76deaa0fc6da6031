use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to open input {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Chunk(#[from] ragprep_chunk::ChunkError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("shard count must be greater than zero")]
    ZeroShards,

    #[error("shard {shard} failed: {source}")]
    ShardFailed {
        shard: usize,
        #[source]
        source: Box<RecordError>,
    },

    #[error("shard task failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}
