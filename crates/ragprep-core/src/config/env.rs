use std::path::PathBuf;

use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("RAGPREP_RAW_ROOT") {
            self.paths.raw_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("RAGPREP_PROCESSED_ROOT") {
            self.paths.processed_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("RAGPREP_STRUCTURED_DIR") {
            self.paths.structured_dir = v;
        }
        if let Ok(v) = std::env::var("RAGPREP_MAX_CHUNK_BYTES") {
            match v.parse::<usize>() {
                Ok(bytes) => self.chunking.max_chunk_bytes = bytes,
                Err(_) => tracing::warn!("ignoring invalid RAGPREP_MAX_CHUNK_BYTES value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("RAGPREP_SHARDS") {
            match v.parse::<usize>() {
                Ok(n) => self.partition.shards = Some(n),
                Err(_) => tracing::warn!("ignoring invalid RAGPREP_SHARDS value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("RAGPREP_REDACTION_ENABLED") {
            match v.parse::<bool>() {
                Ok(enabled) => self.redaction.enabled = enabled,
                Err(_) => tracing::warn!("ignoring invalid RAGPREP_REDACTION_ENABLED value: {v}"),
            }
        }
    }
}
