use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write chunk {index} to {path}: {source}")]
    Write {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chunk byte ceiling must be greater than zero")]
    ZeroCeiling,
}
