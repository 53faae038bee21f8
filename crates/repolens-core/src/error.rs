use std::path::PathBuf;

/// Startup configuration failures. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting: {0}")]
    Missing(String),

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error(
        "unknown agent kind: {0} (known kinds: {known})",
        known = crate::agent::registry::known_kinds().join(", ")
    )]
    UnknownAgent(String),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] repolens_llm::LlmError),
}
