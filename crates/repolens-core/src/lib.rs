//! Configuration, context agents and the completion forwarding pipeline.

pub mod agent;
pub mod aggregator;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod forwarder;
pub mod prompt;

pub use agent::{AgentError, ContextAgent};
pub use aggregator::ContextAggregator;
pub use config::Config;
pub use error::ConfigError;
pub use forwarder::{CompletionForwarder, CompletionResult};
