use std::io::Write;
use std::path::Path;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 6] = [
    "RAGPREP_RAW_ROOT",
    "RAGPREP_PROCESSED_ROOT",
    "RAGPREP_STRUCTURED_DIR",
    "RAGPREP_MAX_CHUNK_BYTES",
    "RAGPREP_SHARDS",
    "RAGPREP_REDACTION_ENABLED",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn defaults_match_ingestion_limits() {
    let config = Config::default();
    assert_eq!(config.chunking.max_chunk_bytes, 41_943_040);
    assert_eq!(config.partition.shards, None);
    assert_eq!(config.paths.structured_dir, "json");
    assert_eq!(config.normalize.reserved_keys, ["id", "timestamp", "internal_hash"]);
    assert!(config.normalize.sub_schemas.is_empty());
    assert!(config.redaction.enabled);
    assert_eq!(config.redaction.triggers, ["patient", "ssn"]);
    assert_eq!(config.redaction.marker, "[HIPAA REDACTION APPLIED]");
    assert_eq!(config.redaction.substitutions.len(), 1);
}

#[test]
fn processed_layout_paths() {
    let paths = PathsConfig {
        raw_root: "/data/raw".into(),
        processed_root: "/data/out".into(),
        structured_dir: "json".into(),
    };
    assert_eq!(paths.structured_root(), Path::new("/data/raw/json"));
    assert_eq!(paths.chunks_dir(), Path::new("/data/out/json_chunks"));
    assert_eq!(paths.documents_dir(), Path::new("/data/out/documents"));
    assert_eq!(paths.quarantine_dir(), Path::new("/data/out/unsupported_files"));
}

#[test]
#[serial]
fn load_missing_file_uses_defaults() {
    clear_env();
    let config = Config::load(Path::new("/nonexistent/ragprep.toml")).unwrap();
    assert_eq!(config.chunking.max_chunk_bytes, DEFAULT_MAX_CHUNK_BYTES);
}

#[test]
#[serial]
fn load_partial_file_fills_defaults() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[chunking]
max_chunk_bytes = 1024

[partition]
shards = 8

[[normalize.sub_schemas]]
field = "billing"
fields = [
    {{ key = "plan", label = "Plan", default = "None" }},
]
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.chunking.max_chunk_bytes, 1024);
    assert_eq!(config.partition.shards, Some(8));
    assert_eq!(config.normalize.sub_schemas.len(), 1);
    assert_eq!(config.normalize.sub_schemas[0].fields[0].label, "Plan");
    assert_eq!(config.normalize.reserved_keys.len(), 3);
    assert_eq!(config.redaction.triggers, ["patient", "ssn"]);
}

#[test]
#[serial]
fn load_invalid_toml_fails() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[chunking\nmax_chunk_bytes = ").unwrap();
    assert!(Config::load(file.path()).is_err());
}

#[test]
#[serial]
fn env_overrides_apply_after_file() {
    clear_env();
    unsafe {
        std::env::set_var("RAGPREP_MAX_CHUNK_BYTES", "2048");
        std::env::set_var("RAGPREP_SHARDS", "4");
        std::env::set_var("RAGPREP_RAW_ROOT", "/tmp/raw");
        std::env::set_var("RAGPREP_REDACTION_ENABLED", "false");
    }
    let config = Config::load(Path::new("/nonexistent/ragprep.toml")).unwrap();
    clear_env();

    assert_eq!(config.chunking.max_chunk_bytes, 2048);
    assert_eq!(config.partition.shards, Some(4));
    assert_eq!(config.paths.raw_root, Path::new("/tmp/raw"));
    assert!(!config.redaction.enabled);
}

#[test]
#[serial]
fn invalid_env_values_are_ignored() {
    clear_env();
    unsafe {
        std::env::set_var("RAGPREP_MAX_CHUNK_BYTES", "forty megabytes");
        std::env::set_var("RAGPREP_SHARDS", "-3");
        std::env::set_var("RAGPREP_REDACTION_ENABLED", "maybe");
    }
    let config = Config::load(Path::new("/nonexistent/ragprep.toml")).unwrap();
    clear_env();

    assert_eq!(config.chunking.max_chunk_bytes, DEFAULT_MAX_CHUNK_BYTES);
    assert_eq!(config.partition.shards, None);
    assert!(config.redaction.enabled);
}

#[test]
fn validate_accepts_defaults() {
    Config::default().validate().unwrap();
}

#[test]
fn validate_rejects_zero_ceiling() {
    let mut config = Config::default();
    config.chunking.max_chunk_bytes = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("max_chunk_bytes"));
}

#[test]
fn validate_rejects_zero_shards() {
    let mut config = Config::default();
    config.partition.shards = Some(0);
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_empty_trigger() {
    let mut config = Config::default();
    config.redaction.triggers.push("  ".into());
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_empty_literal() {
    let mut config = Config::default();
    config.redaction.substitutions.push(Substitution {
        literal: String::new(),
        mask: "[MASKED]".into(),
    });
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_schema_without_fields() {
    let mut config = Config::default();
    config.normalize.sub_schemas.push(SubSchemaConfig {
        field: "billing".into(),
        fields: Vec::new(),
    });
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("billing"));
}

#[test]
fn config_serialize_roundtrip() {
    let mut config = Config::default();
    config.partition.shards = Some(100);
    let toml_str = toml::to_string_pretty(&config).expect("serialize");
    let back: Config = toml::from_str(&toml_str).expect("deserialize");
    assert_eq!(back.chunking.max_chunk_bytes, config.chunking.max_chunk_bytes);
    assert_eq!(back.partition.shards, Some(100));
    assert_eq!(back.paths.raw_root, config.paths.raw_root);
    assert_eq!(back.redaction.substitutions, config.redaction.substitutions);
}
