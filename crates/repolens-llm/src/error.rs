#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Network failure or timeout before a response was received.
    #[error("backend unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client construction failed: {0}")]
    ClientBuild(String),

    #[error("{0}")]
    Other(String),
}

impl LlmError {
    /// Whether the failure happened before the backend produced a response.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
