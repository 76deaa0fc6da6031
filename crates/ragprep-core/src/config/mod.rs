mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject values that would break the chunking or redaction invariants.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunking.max_chunk_bytes == 0 {
            bail!("chunking.max_chunk_bytes must be greater than zero");
        }
        if self.partition.shards == Some(0) {
            bail!("partition.shards must be greater than zero when set");
        }
        if self.paths.structured_dir.trim().is_empty() {
            bail!("paths.structured_dir must not be empty");
        }
        if self.redaction.marker.trim().is_empty() {
            bail!("redaction.marker must not be empty");
        }
        if let Some(t) = self.redaction.triggers.iter().find(|t| t.trim().is_empty()) {
            bail!("redaction.triggers contains an empty entry: {t:?}");
        }
        if self
            .redaction
            .substitutions
            .iter()
            .any(|s| s.literal.is_empty())
        {
            bail!("redaction.substitutions contains an empty literal");
        }
        for schema in &self.normalize.sub_schemas {
            if schema.field.is_empty() {
                bail!("normalize.sub_schemas entry has an empty field name");
            }
            if schema.fields.is_empty() {
                bail!("normalize.sub_schemas.{} declares no fields", schema.field);
            }
        }
        Ok(())
    }
}
