//! Concurrent fan-out over context agents with ordered, failure-isolated fan-in.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt as _;
use futures::future::join_all;

use crate::agent::ContextAgent;

/// Separator placed between contributions from different agents.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Runs every registered agent for a query and merges their output.
#[derive(Clone, Default)]
pub struct ContextAggregator {
    agents: Vec<Arc<dyn ContextAgent>>,
}

impl ContextAggregator {
    #[must_use]
    pub fn new(agents: Vec<Arc<dyn ContextAgent>>) -> Self {
        Self { agents }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub async fn aggregate(&self, query: &str) -> String {
        aggregate(&self.agents, query).await
    }
}

impl std::fmt::Debug for ContextAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.agents.iter().map(|a| a.name()).collect();
        f.debug_struct("ContextAggregator")
            .field("agents", &names)
            .finish()
    }
}

/// Invoke all `agents` concurrently and join their non-empty results in
/// registration order.
///
/// An agent that errors or panics is logged and contributes nothing; the
/// remaining agents are unaffected.
pub async fn aggregate(agents: &[Arc<dyn ContextAgent>], query: &str) -> String {
    let runs = agents.iter().map(|agent| async move {
        let outcome = AssertUnwindSafe(agent.build_context(query))
            .catch_unwind()
            .await;
        (agent.name(), outcome)
    });

    let mut parts = Vec::with_capacity(agents.len());
    for (name, outcome) in join_all(runs).await {
        match outcome {
            Ok(Ok(context)) if context.is_empty() => {
                tracing::debug!(agent = name, "agent returned no context");
            }
            Ok(Ok(context)) => {
                tracing::debug!(agent = name, chars = context.len(), "agent contributed context");
                parts.push(context);
            }
            Ok(Err(e)) => tracing::warn!(agent = name, "context agent failed: {e}"),
            Err(_) => tracing::error!(agent = name, "context agent panicked"),
        }
    }
    parts.join(CONTEXT_SEPARATOR)
}
