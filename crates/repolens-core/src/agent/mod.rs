//! Context agents: pluggable sources of prompt context for a user query.

pub mod registry;
pub mod repo_search;
pub mod static_agents;

pub use registry::build_agents;
pub use repo_search::RepoSearchAgent;
pub use static_agents::{NoopAgent, StaticAgent};

use repolens_index::StoreError;
use repolens_llm::LlmError;
use repolens_llm::provider::BoxFuture;

/// Why an agent contributed nothing. The aggregator logs these and moves on.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("query embedding failed: {0}")]
    Embedding(#[from] LlmError),

    #[error("query embedding returned no vector")]
    EmptyEmbedding,

    #[error("index search failed: {0}")]
    Search(#[from] StoreError),
}

/// Produces a block of context text for a user query.
///
/// An empty string means "nothing relevant"; an error means the agent could
/// not answer. Neither aborts the request.
pub trait ContextAgent: Send + Sync {
    fn name(&self) -> &str;

    fn build_context<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<String, AgentError>>;
}
