//! Error types for repolens-index.

use std::num::TryFromIntError;

use crate::store::StoreError;

/// Errors that abort an indexing run.
///
/// Per-file problems (unreadable file, embedding shortfall) are logged and
/// skipped instead of surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// IO error on the progress log.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding failure during collection bootstrap.
    #[error("embedding failed: {0}")]
    Embedding(#[from] repolens_llm::LlmError),

    /// The probe embedding came back without a usable vector.
    #[error("embedding probe returned no vector")]
    EmptyProbe,

    /// Index store error outside of upsert (collection setup, point count).
    #[error("index store error: {0}")]
    Store(#[from] StoreError),

    /// Upsert failed; continuing would silently lose chunks.
    #[error("upsert failed with {pending_files} file(s) pending, aborting run: {source}")]
    IntegrityRisk {
        source: StoreError,
        pending_files: usize,
    },

    /// Invalid indexer configuration.
    #[error("invalid indexer configuration: {0}")]
    Config(String),

    /// Integer conversion error.
    #[error("integer conversion failed: {0}")]
    IntConversion(#[from] TryFromIntError),
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
