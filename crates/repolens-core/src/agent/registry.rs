//! Static mapping from configured agent kind to constructor.

use std::sync::Arc;
use std::time::Duration;

use repolens_index::qdrant::QdrantRestStore;
use repolens_llm::Embedder;
use repolens_llm::http::build_client;
use serde::de::DeserializeOwned;

use super::repo_search::{DEFAULT_LIMIT, DEFAULT_TIMEOUT_SECS, RepoSearchOptions};
use super::{ContextAgent, NoopAgent, RepoSearchAgent, StaticAgent};
use crate::config::{AgentDecl, Config};
use crate::error::ConfigError;

/// Shared collaborators handed to every constructor.
pub struct AgentDeps<'a> {
    pub config: &'a Config,
    pub embedder: Arc<dyn Embedder>,
}

type Constructor = fn(&AgentDecl, &AgentDeps<'_>) -> Result<Arc<dyn ContextAgent>, ConfigError>;

const REGISTRY: &[(&str, Constructor)] = &[
    ("repo_search", build_repo_search),
    ("noop", build_noop),
    ("static", build_static),
];

#[must_use]
pub fn is_known_kind(kind: &str) -> bool {
    REGISTRY.iter().any(|(k, _)| *k == kind)
}

#[must_use]
pub fn known_kinds() -> Vec<&'static str> {
    REGISTRY.iter().map(|(k, _)| *k).collect()
}

/// Construct every enabled agent from `config.agents`, preserving order.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownAgent`] for an unregistered kind and
/// [`ConfigError::Invalid`] or [`ConfigError::Missing`] for bad options.
pub fn build_agents(
    config: &Config,
    embedder: Arc<dyn Embedder>,
) -> Result<Vec<Arc<dyn ContextAgent>>, ConfigError> {
    let deps = AgentDeps { config, embedder };
    let mut agents = Vec::with_capacity(config.agents.len());
    for decl in &config.agents {
        let Some((_, constructor)) = REGISTRY.iter().find(|(k, _)| *k == decl.kind) else {
            return Err(ConfigError::UnknownAgent(decl.kind.clone()));
        };
        if !decl.enabled {
            tracing::debug!(kind = %decl.kind, "agent disabled");
            continue;
        }
        agents.push(constructor(decl, &deps)?);
        tracing::info!(kind = %decl.kind, "context agent registered");
    }
    Ok(agents)
}

fn parse_options<T: DeserializeOwned>(decl: &AgentDecl) -> Result<T, ConfigError> {
    toml::Value::Table(decl.options.clone())
        .try_into()
        .map_err(|e| ConfigError::Invalid(format!("options for agent '{}': {e}", decl.kind)))
}

fn build_repo_search(
    decl: &AgentDecl,
    deps: &AgentDeps<'_>,
) -> Result<Arc<dyn ContextAgent>, ConfigError> {
    let opts: RepoSearchOptions = parse_options(decl)?;
    let index = &deps.config.index;
    let timeout = Duration::from_secs(opts.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let client = build_client(deps.config.egress(), timeout)?;
    let store = QdrantRestStore::new(opts.qdrant_url.unwrap_or_else(|| index.qdrant_url.clone()))
        .with_client(client)
        .with_api_key(index.qdrant_api_key.clone());
    let collection = opts.collection.unwrap_or_else(|| index.collection.clone());

    let agent = RepoSearchAgent::new(Arc::new(store), Arc::clone(&deps.embedder), collection)
        .with_limit(opts.limit.unwrap_or(DEFAULT_LIMIT));
    Ok(Arc::new(agent))
}

fn build_noop(
    _decl: &AgentDecl,
    _deps: &AgentDeps<'_>,
) -> Result<Arc<dyn ContextAgent>, ConfigError> {
    Ok(Arc::new(NoopAgent))
}

#[derive(serde::Deserialize)]
struct StaticOptions {
    #[serde(default)]
    text: Option<String>,
}

fn build_static(
    decl: &AgentDecl,
    _deps: &AgentDeps<'_>,
) -> Result<Arc<dyn ContextAgent>, ConfigError> {
    let opts: StaticOptions = parse_options(decl)?;
    let text = opts
        .text
        .ok_or_else(|| ConfigError::Missing("agents.options.text for static agent".into()))?;
    Ok(Arc::new(StaticAgent::new(text)))
}

#[cfg(test)]
mod tests {
    use repolens_llm::mock::MockEmbedder;

    use super::*;

    fn embedder() -> Arc<dyn Embedder> {
        Arc::new(MockEmbedder::default())
    }

    fn decl(kind: &str, options: &str) -> AgentDecl {
        AgentDecl {
            kind: kind.into(),
            enabled: true,
            options: toml::from_str(options).unwrap(),
        }
    }

    #[test]
    fn default_agents_in_order() {
        let agents = build_agents(&Config::default(), embedder()).unwrap();
        let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["repo_search", "noop"]);
    }

    #[test]
    fn unknown_kind_is_config_error() {
        let config = Config {
            agents: vec![AgentDecl::new("agents.agent3.Mystery")],
            ..Config::default()
        };
        let err = build_agents(&config, embedder()).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownAgent(ref k) if k == "agents.agent3.Mystery"));
    }

    #[test]
    fn disabled_agents_are_skipped() {
        let mut noop = AgentDecl::new("noop");
        noop.enabled = false;
        let config = Config {
            agents: vec![noop, decl("static", r#"text = "hi""#)],
            ..Config::default()
        };
        let agents = build_agents(&config, embedder()).unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name(), "static");
    }

    #[test]
    fn static_requires_text() {
        let config = Config {
            agents: vec![AgentDecl::new("static")],
            ..Config::default()
        };
        assert!(matches!(
            build_agents(&config, embedder()),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn invalid_option_type_is_rejected() {
        let config = Config {
            agents: vec![decl("repo_search", r#"limit = "eight""#)],
            ..Config::default()
        };
        assert!(matches!(
            build_agents(&config, embedder()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn registry_lists_kinds() {
        assert!(is_known_kind("repo_search"));
        assert!(!is_known_kind("RepoSearchAgent"));
        assert_eq!(known_kinds(), vec!["repo_search", "noop", "static"]);
    }

    #[test]
    fn unknown_kind_error_lists_known_kinds() {
        let config = Config {
            agents: vec![AgentDecl::new("agents.agent2.ExampleAgent")],
            ..Config::default()
        };
        let Err(err) = build_agents(&config, embedder()) else {
            panic!("expected an error");
        };
        let message = err.to_string();
        assert!(message.starts_with("unknown agent kind: agents.agent2.ExampleAgent"));
        assert!(message.ends_with("(known kinds: repo_search, noop, static)"));
    }
}
