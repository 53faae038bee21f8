use repolens_llm::provider::BoxFuture;

use super::{AgentError, ContextAgent};

/// Contributes nothing. Useful as a placeholder entry in `[[agents]]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAgent;

impl ContextAgent for NoopAgent {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "noop"
    }

    fn build_context<'a>(&'a self, _query: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
        Box::pin(async { Ok(String::new()) })
    }
}

/// Returns the same configured text for every query.
#[derive(Debug, Clone)]
pub struct StaticAgent {
    text: String,
}

impl StaticAgent {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ContextAgent for StaticAgent {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "static"
    }

    fn build_context<'a>(&'a self, _query: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
        Box::pin(async move { Ok(self.text.clone()) })
    }
}
