//! Embedding and chat completion clients for OpenAI-compatible backends.

pub mod completion;
pub mod embedding;
pub mod error;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;

pub use error::LlmError;
pub use provider::{CompletionBackend, Embedder, Message, Role};
