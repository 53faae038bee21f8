use std::fmt;

use serde::Serialize;

use crate::error::{LlmError, Result};
use crate::http::trim_base_url;
use crate::provider::{CompletionBackend, CompletionFuture, Message};

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The response body is returned as raw JSON so the proxy can pass it
/// through untouched.
#[derive(Clone)]
pub struct ChatCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

impl ChatCompletionClient {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: crate::http::default_client(),
            base_url: trim_base_url(base_url.into()),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// # Errors
    ///
    /// Returns [`LlmError::Unavailable`] on transport failure,
    /// [`LlmError::Status`] on a non-success response and
    /// [`LlmError::Json`] if the body is not JSON.
    pub async fn send(&self, messages: &[Message]) -> Result<serde_json::Value> {
        let body = ChatRequest {
            model: &self.model,
            messages,
        };

        let mut request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!("completion API error {status}: {text}");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

impl CompletionBackend for ChatCompletionClient {
    fn complete<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
        Box::pin(self.send(messages))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}
