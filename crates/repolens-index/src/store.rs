use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("upsert error: {0}")]
    Upsert(String),
    #[error("search error: {0}")]
    Search(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Payload stored alongside every indexed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPayload {
    pub text: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

/// Payload as read back from the index. Either key may be absent for points
/// written by other tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HitPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalHit {
    pub score: f32,
    pub payload: HitPayload,
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Vector index service used by both the indexer and the retrieval agent.
pub trait IndexStore: Send + Sync {
    /// Whether `collection` exists. Connectivity failures report `false`.
    fn exists(&self, collection: &str) -> BoxFuture<'_, bool>;

    /// Create `collection` with cosine distance and the given vector size.
    fn create(&self, collection: &str, dimension: u64) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Exact number of points currently stored in `collection`.
    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, StoreError>>;

    fn upsert(
        &self,
        collection: &str,
        points: Vec<IndexedPoint>,
    ) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Nearest neighbours of `vector`, best match first.
    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        with_payload: bool,
    ) -> BoxFuture<'_, Result<Vec<RetrievalHit>, StoreError>>;
}
