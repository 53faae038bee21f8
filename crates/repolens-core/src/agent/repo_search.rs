use std::fmt::Write as _;
use std::sync::Arc;

use repolens_index::IndexStore;
use repolens_index::store::RetrievalHit;
use repolens_llm::Embedder;
use repolens_llm::provider::BoxFuture;
use serde::Deserialize;

use super::{AgentError, ContextAgent};

/// `[agents.options]` accepted by the `repo_search` kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoSearchOptions {
    #[serde(default)]
    pub limit: Option<u64>,
    /// Defaults to `index.collection`.
    #[serde(default, alias = "collection_name")]
    pub collection: Option<String>,
    /// Defaults to `index.qdrant_url`.
    #[serde(default)]
    pub qdrant_url: Option<String>,
    #[serde(default, alias = "timeout")]
    pub timeout_secs: Option<u64>,
}

pub const DEFAULT_LIMIT: u64 = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Retrieves the nearest indexed chunks for the query.
pub struct RepoSearchAgent {
    store: Arc<dyn IndexStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    limit: u64,
}

impl RepoSearchAgent {
    #[must_use]
    pub fn new(
        store: Arc<dyn IndexStore>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
            limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    async fn search(&self, query: &str) -> Result<String, AgentError> {
        if !self.store.exists(&self.collection).await {
            tracing::debug!(
                collection = %self.collection,
                "collection missing, no repository context"
            );
            return Ok(String::new());
        }

        let vectors = self.embedder.embed(&[query.to_owned()]).await?;
        let vector = vectors.into_iter().next().ok_or(AgentError::EmptyEmbedding)?;

        let hits = self
            .store
            .search(&self.collection, vector, self.limit, true)
            .await?;
        tracing::debug!(collection = %self.collection, hits = hits.len(), "repository search");
        Ok(format_hits(&hits))
    }
}

impl ContextAgent for RepoSearchAgent {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "repo_search"
    }

    fn build_context<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
        Box::pin(self.search(query))
    }
}

/// Render hits as numbered `[DOC i]` excerpts separated by blank lines.
#[must_use]
pub fn format_hits(hits: &[RetrievalHit]) -> String {
    let mut parts = Vec::with_capacity(hits.len());
    for (i, hit) in hits.iter().enumerate() {
        let path = hit.payload.path.as_deref().unwrap_or("unknown");
        let text = hit.payload.text.as_deref().unwrap_or_default();
        let mut part = String::with_capacity(path.len() + text.len() + 24);
        let _ = writeln!(part, "[DOC {}] file: {path}", i + 1);
        let _ = writeln!(part, "{text}");
        parts.push(part);
    }
    parts.join("\n\n")
}
