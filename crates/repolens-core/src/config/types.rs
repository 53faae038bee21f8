use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Context agents in registration order.
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentDecl>,
}

/// Chat completion backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "http://localhost:8080".into()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            model: String::new(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Embedding backend, shared by the indexer and retrieval agents.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_base_url() -> String {
    "http://localhost:8081".into()
}

fn default_embedding_timeout() -> u64 {
    300
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_base_url(),
            api_key: None,
            model: String::new(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

/// Outbound HTTP policy applied to every client.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Honour `HTTP_PROXY`-style variables. Off by default so backends on the
    /// local network are reached directly.
    #[serde(default)]
    pub use_system_proxy: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
    #[serde(default)]
    pub qdrant_api_key: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Defaults to `<source_root>/.repolens-progress`.
    #[serde(default)]
    pub progress_log: Option<PathBuf>,
}

fn default_qdrant_url() -> String {
    "http://127.0.0.1:6333".into()
}

pub(crate) fn default_collection() -> String {
    "repo_chunks".into()
}

fn default_chunk_size() -> usize {
    1500
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_embed_batch_size() -> usize {
    16
}

fn default_upsert_batch_size() -> usize {
    500
}

fn default_extensions() -> Vec<String> {
    repolens_index::files::DEFAULT_EXTENSIONS
        .iter()
        .map(|e| (*e).to_owned())
        .collect()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            qdrant_api_key: None,
            collection: default_collection(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embed_batch_size: default_embed_batch_size(),
            upsert_batch_size: default_upsert_batch_size(),
            extensions: default_extensions(),
            progress_log: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default = "default_gateway_max_body")]
    pub max_body_size: usize,
}

fn default_gateway_bind() -> String {
    "0.0.0.0".into()
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_gateway_max_body() -> usize {
    4 * 1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
            max_body_size: default_gateway_max_body(),
        }
    }
}

/// One `[[agents]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AgentDecl {
    /// Registry key, e.g. `repo_search`.
    pub kind: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Free-form options interpreted by the agent constructor.
    #[serde(default)]
    pub options: toml::Table,
}

impl AgentDecl {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            enabled: true,
            options: toml::Table::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_agents() -> Vec<AgentDecl> {
    vec![AgentDecl::new("repo_search"), AgentDecl::new("noop")]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            network: NetworkConfig::default(),
            index: IndexConfig::default(),
            gateway: GatewayConfig::default(),
            agents: default_agents(),
        }
    }
}
