mod env;
mod types;


pub use types::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use repolens_index::IndexerConfig;
use repolens_index::chunker::ChunkerConfig;
use repolens_index::files::FileFilter;
use repolens_llm::http::EgressConfig;

use crate::agent::registry;
use crate::error::ConfigError;

/// Name of the progress log written inside the indexed tree.
pub const PROGRESS_LOG_NAME: &str = ".repolens-progress";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str::<Self>(&content)?
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Check settings that would otherwise fail later at request time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for empty backend endpoints or model
    /// names, [`ConfigError::Invalid`] for inconsistent indexing parameters and
    /// [`ConfigError::UnknownAgent`] for an unregistered agent kind.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("llm.base_url", &self.llm.base_url)?;
        require("llm.model", &self.llm.model)?;
        require("embedding.base_url", &self.embedding.base_url)?;
        require("embedding.model", &self.embedding.model)?;
        require("index.qdrant_url", &self.index.qdrant_url)?;
        require("index.collection", &self.index.collection)?;

        self.indexer_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        for decl in &self.agents {
            if !registry::is_known_kind(&decl.kind) {
                return Err(ConfigError::UnknownAgent(decl.kind.clone()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn egress(&self) -> EgressConfig {
        EgressConfig {
            use_system_proxy: self.network.use_system_proxy,
        }
    }

    #[must_use]
    pub fn indexer_config(&self) -> IndexerConfig {
        IndexerConfig {
            collection: self.index.collection.clone(),
            chunker: ChunkerConfig {
                max_chars: self.index.chunk_size,
                overlap: self.index.chunk_overlap,
            },
            filter: FileFilter::new(&self.index.extensions),
            embed_batch_size: self.index.embed_batch_size,
            upsert_batch_size: self.index.upsert_batch_size,
        }
    }

    /// Progress log location for indexing `source_root`.
    #[must_use]
    pub fn progress_log_path(&self, source_root: &Path) -> PathBuf {
        self.index
            .progress_log
            .clone()
            .unwrap_or_else(|| source_root.join(PROGRESS_LOG_NAME))
    }

    #[must_use]
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    #[must_use]
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding.timeout_secs)
    }
}

fn require(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(key.to_owned()));
    }
    Ok(())
}
