//! Application bootstrap: config resolution and backend construction.

use std::path::PathBuf;
use std::sync::Arc;

use repolens_index::CorpusIndexer;
use repolens_index::qdrant::QdrantRestStore;
use repolens_llm::Embedder;
use repolens_llm::completion::ChatCompletionClient;
use repolens_llm::embedding::EmbeddingClient;
use repolens_llm::http::build_client;

use crate::agent::build_agents;
use crate::aggregator::ContextAggregator;
use crate::config::Config;
use crate::error::ConfigError;
use crate::forwarder::CompletionForwarder;

/// Priority: explicit `--config` > `REPOLENS_CONFIG` env > `config/default.toml`.
#[must_use]
pub fn resolve_config_path(cli: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli {
        return path;
    }
    if let Ok(path) = std::env::var("REPOLENS_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

/// Load, override from env and validate.
///
/// # Errors
///
/// Returns the first [`ConfigError`] encountered.
pub fn load_config(path: &std::path::Path) -> Result<Config, ConfigError> {
    let config = Config::load(path)?;
    config.validate()?;
    Ok(config)
}

/// # Errors
///
/// Returns [`ConfigError::Client`] if the HTTP client cannot be built.
pub fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>, ConfigError> {
    let client = build_client(config.egress(), config.embedding_timeout())?;
    let embedder = EmbeddingClient::new(
        config.embedding.base_url.clone(),
        config.embedding.api_key.clone(),
        config.embedding.model.clone(),
    )
    .with_client(client);
    Ok(Arc::new(embedder))
}

/// # Errors
///
/// Returns [`ConfigError::Client`] if the HTTP client cannot be built.
pub fn build_index_store(config: &Config) -> Result<QdrantRestStore, ConfigError> {
    let client = build_client(config.egress(), config.embedding_timeout())?;
    Ok(QdrantRestStore::new(config.index.qdrant_url.clone())
        .with_client(client)
        .with_api_key(config.index.qdrant_api_key.clone()))
}

/// Forwarder wired to the configured completion backend and agents.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a client cannot be built or an agent
/// declaration is invalid.
pub fn build_forwarder(config: &Config) -> Result<CompletionForwarder, ConfigError> {
    let embedder = build_embedder(config)?;
    let agents = build_agents(config, embedder)?;
    if agents.is_empty() {
        tracing::warn!("no context agents enabled, requests will be forwarded without context");
    }

    let client = build_client(config.egress(), config.llm_timeout())?;
    let backend = ChatCompletionClient::new(
        config.llm.base_url.clone(),
        config.llm.api_key.clone(),
        config.llm.model.clone(),
    )
    .with_client(client);

    Ok(CompletionForwarder::new(
        Arc::new(backend),
        ContextAggregator::new(agents),
    ))
}

/// # Errors
///
/// Returns a [`ConfigError`] if a client cannot be built.
pub fn build_indexer(config: &Config) -> Result<CorpusIndexer, ConfigError> {
    let store = build_index_store(config)?;
    let embedder = build_embedder(config)?;
    Ok(CorpusIndexer::new(
        Arc::new(store),
        embedder,
        config.indexer_config(),
    ))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.llm.model = "qwen2.5-coder".into();
        config.embedding.model = "nomic-embed-text".into();
        config
    }

    #[test]
    #[serial]
    fn cli_path_wins() {
        unsafe { std::env::set_var("REPOLENS_CONFIG", "/from/env.toml") };
        let path = resolve_config_path(Some(PathBuf::from("/from/cli.toml")));
        unsafe { std::env::remove_var("REPOLENS_CONFIG") };
        assert_eq!(path, PathBuf::from("/from/cli.toml"));
    }

    #[test]
    #[serial]
    fn env_path_then_default() {
        unsafe { std::env::set_var("REPOLENS_CONFIG", "/from/env.toml") };
        assert_eq!(resolve_config_path(None), PathBuf::from("/from/env.toml"));
        unsafe { std::env::remove_var("REPOLENS_CONFIG") };
        assert_eq!(resolve_config_path(None), PathBuf::from("config/default.toml"));
    }

    #[test]
    fn forwarder_registers_default_agents() {
        let forwarder = build_forwarder(&valid_config()).unwrap();
        assert_eq!(forwarder.aggregator().len(), 2);
    }

    #[test]
    fn indexer_uses_index_settings() {
        let mut config = valid_config();
        config.index.collection = "puppet".into();
        config.index.embed_batch_size = 4;
        let indexer = build_indexer(&config).unwrap();
        assert_eq!(indexer.config().collection, "puppet");
        assert_eq!(indexer.config().embed_batch_size, 4);
    }
}
