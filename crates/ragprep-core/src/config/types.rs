use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ingestion services reject artifacts around 50 MiB; stay well below that.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 40 * 1024 * 1024;

pub const CHUNKS_DIR: &str = "json_chunks";
pub const DOCUMENTS_DIR: &str = "documents";
pub const QUARANTINE_DIR: &str = "unsupported_files";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub partition: PartitionConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
}

fn default_raw_root() -> PathBuf {
    PathBuf::from("remap-my-rag-source-data/raw")
}

fn default_processed_root() -> PathBuf {
    PathBuf::from("remap-my-rag-source-data/processed")
}

fn default_structured_dir() -> String {
    "json".into()
}

/// Raw input tree and processed output layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_raw_root")]
    pub raw_root: PathBuf,
    #[serde(default = "default_processed_root")]
    pub processed_root: PathBuf,
    /// Directory under `raw_root` whose `.jsonl` files feed the chunking pipeline.
    #[serde(default = "default_structured_dir")]
    pub structured_dir: String,
}

impl PathsConfig {
    #[must_use]
    pub fn structured_root(&self) -> PathBuf {
        self.raw_root.join(&self.structured_dir)
    }

    #[must_use]
    pub fn chunks_dir(&self) -> PathBuf {
        self.processed_root.join(CHUNKS_DIR)
    }

    #[must_use]
    pub fn documents_dir(&self) -> PathBuf {
        self.processed_root.join(DOCUMENTS_DIR)
    }

    #[must_use]
    pub fn quarantine_dir(&self) -> PathBuf {
        self.processed_root.join(QUARANTINE_DIR)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_root: default_raw_root(),
            processed_root: default_processed_root(),
            structured_dir: default_structured_dir(),
        }
    }
}

fn default_max_chunk_bytes() -> usize {
    DEFAULT_MAX_CHUNK_BYTES
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: default_max_chunk_bytes(),
        }
    }
}

/// Sharded execution settings. `shards = None` derives the count from input size.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PartitionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shards: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_triggers() -> Vec<String> {
    vec!["patient".into(), "ssn".into()]
}

fn default_marker() -> String {
    "[HIPAA REDACTION APPLIED]".into()
}

fn default_substitutions() -> Vec<Substitution> {
    vec![Substitution {
        literal: "John Smith".into(),
        mask: "[PHI_NAME_MASKED]".into(),
    }]
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Substitution {
    pub literal: String,
    pub mask: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedactionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Case-insensitive tokens that mark text as sensitive.
    #[serde(default = "default_triggers")]
    pub triggers: Vec<String>,
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Literal replacements applied, in order, to triggered text.
    #[serde(default = "default_substitutions")]
    pub substitutions: Vec<Substitution>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            triggers: default_triggers(),
            marker: default_marker(),
            substitutions: default_substitutions(),
        }
    }
}

fn default_reserved_keys() -> Vec<String> {
    vec!["id".into(), "timestamp".into(), "internal_hash".into()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NormalizeConfig {
    /// Record keys never rendered into narratives.
    #[serde(default = "default_reserved_keys")]
    pub reserved_keys: Vec<String>,
    /// Extra nested sub-schemas, added on top of the built-in ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_schemas: Vec<SubSchemaConfig>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            reserved_keys: default_reserved_keys(),
            sub_schemas: Vec::new(),
        }
    }
}

/// A nested mapping rendered as `"{label}: {value}."` sentences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubSchemaConfig {
    pub field: String,
    pub fields: Vec<SubFieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubFieldConfig {
    pub key: String,
    pub label: String,
    pub default: String,
}
