use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LlmError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type EmbedFuture<'a> = BoxFuture<'a, Result<Vec<Vec<f32>>, LlmError>>;

pub type CompletionFuture<'a> = BoxFuture<'a, Result<serde_json::Value, LlmError>>;

/// Message author. Roles the proxy does not interpret are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Developer,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Developer => "developer",
            Self::Other(role) => role,
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "tool" => Self::Tool,
            "developer" => Self::Developer,
            _ => Self::Other(role),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_owned(),
        }
    }
}

/// One chat message in OpenAI wire format.
///
/// Client messages round-trip unchanged: `content` keeps its JSON shape
/// (string, content parts or `null`) and every other field lands in `extra`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// `None` when the field was absent, `Some(Value::Null)` for an explicit `null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(serde_json::Value::String(content.into())),
            extra: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Content as plain text; `None` for content parts, `null` or a missing field.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(serde_json::Value::as_str)
    }
}

/// Turns text into fixed-dimension vectors.
pub trait Embedder: Send + Sync {
    /// Embed `texts`, returning vectors in input order.
    ///
    /// A backend may return fewer vectors than inputs; callers decide how to
    /// handle the shortfall.
    fn embed<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a>;

    fn name(&self) -> &str;
}

/// Forwards a conversation to a chat completion endpoint.
pub trait CompletionBackend: Send + Sync {
    /// Send `messages` and return the backend's completion JSON verbatim.
    fn complete<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a>;

    fn model(&self) -> &str;
}
