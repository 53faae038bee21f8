//! Context-augmented forwarding to the completion backend.

use std::sync::Arc;

use repolens_llm::{CompletionBackend, LlmError, Message};
use serde::Serialize;

use crate::aggregator::ContextAggregator;
use crate::prompt::{assemble, last_user_message};

pub const CONNECTION_ERROR_TYPE: &str = "llm_connection_error";

/// In-band error body returned instead of a completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Outcome of a forwarded request. Both variants are successful responses
/// from the client's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResult {
    /// Backend completion JSON, passed through verbatim.
    Completion(serde_json::Value),
    Error(ErrorBody),
}

impl CompletionResult {
    fn backend_failure(err: &LlmError) -> Self {
        Self::Error(ErrorBody {
            kind: CONNECTION_ERROR_TYPE.into(),
            message: format!("Failed to connect to LLM backend: {err}"),
        })
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Self::Completion(value) => value,
            Self::Error(body) => serde_json::json!({ "error": body }),
        }
    }
}

/// Enriches a conversation with aggregated context and forwards it.
#[derive(Clone)]
pub struct CompletionForwarder {
    backend: Arc<dyn CompletionBackend>,
    aggregator: ContextAggregator,
}

impl CompletionForwarder {
    #[must_use]
    pub fn new(backend: Arc<dyn CompletionBackend>, aggregator: ContextAggregator) -> Self {
        Self {
            backend,
            aggregator,
        }
    }

    #[must_use]
    pub fn aggregator(&self) -> &ContextAggregator {
        &self.aggregator
    }

    /// Never fails: backend errors become [`CompletionResult::Error`].
    pub async fn forward(&self, conversation: &[Message]) -> CompletionResult {
        let messages = match last_user_message(conversation) {
            Some(query) => {
                let context = self.aggregator.aggregate(query).await;
                tracing::debug!(context_chars = context.len(), "context assembled");
                assemble(conversation, &context)
            }
            None => {
                tracing::debug!("no user message, forwarding conversation unchanged");
                conversation.to_vec()
            }
        };

        match self.backend.complete(&messages).await {
            Ok(value) => CompletionResult::Completion(value),
            Err(e) => {
                tracing::error!(
                    model = self.backend.model(),
                    unreachable = e.is_unavailable(),
                    "LLM request failed: {e}"
                );
                CompletionResult::backend_failure(&e)
            }
        }
    }
}

impl std::fmt::Debug for CompletionForwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionForwarder")
            .field("model", &self.backend.model())
            .field("aggregator", &self.aggregator)
            .finish()
    }
}
