//! Qdrant adapter over its REST interface.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{
    BoxFuture, HitPayload, IndexStore, IndexedPoint, PointPayload, RetrievalHit, StoreError,
};

/// [`IndexStore`] backed by a Qdrant server reached over HTTP.
#[derive(Clone)]
pub struct QdrantRestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for QdrantRestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QdrantRestStore")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl QdrantRestStore {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: repolens_llm::http::default_client(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: None,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Sent as the `api-key` header on every request. Blank keys are ignored.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, format!("{}{path}", self.base_url));
        if let Some(ref key) = self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, "/collections")
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let body: QdrantResponse<CollectionsResult> =
            read_json(response, StoreError::Connection).await?;
        Ok(body.result.collections.into_iter().map(|c| c.name).collect())
    }
}

/// Reads a Qdrant response envelope, mapping non-success statuses through `wrap`.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    wrap: fn(String) -> StoreError,
) -> Result<T, StoreError> {
    let status = response.status();
    let text = response.text().await.map_err(|e| wrap(e.to_string()))?;
    if !status.is_success() {
        return Err(wrap(format!("status {status}: {text}")));
    }
    serde_json::from_str(&text).map_err(|e| StoreError::Serialization(e.to_string()))
}

impl IndexStore for QdrantRestStore {
    fn exists(&self, collection: &str) -> BoxFuture<'_, bool> {
        let collection = collection.to_owned();
        Box::pin(async move {
            match self.list_collections().await {
                Ok(names) => names.iter().any(|n| *n == collection),
                Err(e) => {
                    tracing::warn!(collection = %collection, "index service unreachable: {e}");
                    false
                }
            }
        })
    }

    fn create(&self, collection: &str, dimension: u64) -> BoxFuture<'_, Result<(), StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let body = CreateCollection {
                vectors: VectorParams {
                    size: dimension,
                    distance: "Cosine",
                },
            };
            let response = self
                .request(reqwest::Method::PUT, &format!("/collections/{collection}"))
                .json(&body)
                .send()
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            let _: QdrantResponse<serde_json::Value> =
                read_json(response, StoreError::Collection).await?;
            tracing::info!(collection = %collection, dimension, "created collection");
            Ok(())
        })
    }

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let response = self
                .request(
                    reqwest::Method::POST,
                    &format!("/collections/{collection}/points/count"),
                )
                .json(&serde_json::json!({ "exact": true }))
                .send()
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            let body: QdrantResponse<CountResult> =
                read_json(response, StoreError::Collection).await?;
            Ok(body.result.count)
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<IndexedPoint>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let body = UpsertPoints {
                points: points
                    .iter()
                    .map(|p| WirePoint {
                        id: p.id,
                        vector: &p.vector,
                        payload: &p.payload,
                    })
                    .collect(),
            };
            let response = self
                .request(
                    reqwest::Method::PUT,
                    &format!("/collections/{collection}/points?wait=true"),
                )
                .json(&body)
                .send()
                .await
                .map_err(|e| StoreError::Upsert(e.to_string()))?;
            let _: QdrantResponse<serde_json::Value> =
                read_json(response, StoreError::Upsert).await?;
            Ok(())
        })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        with_payload: bool,
    ) -> BoxFuture<'_, Result<Vec<RetrievalHit>, StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let body = SearchRequest {
                vector: &vector,
                limit,
                with_payload,
            };
            let response = self
                .request(
                    reqwest::Method::POST,
                    &format!("/collections/{collection}/points/search"),
                )
                .json(&body)
                .send()
                .await
                .map_err(|e| StoreError::Search(e.to_string()))?;
            let body: QdrantResponse<Vec<ScoredPoint>> =
                read_json(response, StoreError::Search).await?;
            Ok(body
                .result
                .into_iter()
                .map(|p| RetrievalHit {
                    score: p.score,
                    payload: p.payload.unwrap_or_default(),
                })
                .collect())
        })
    }
}

#[derive(Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Deserialize)]
struct CollectionsResult {
    #[serde(default)]
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Deserialize)]
struct CountResult {
    count: u64,
}

#[derive(Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Option<HitPayload>,
}

#[derive(Serialize)]
struct CreateCollection {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct VectorParams {
    size: u64,
    distance: &'static str,
}

#[derive(Serialize)]
struct UpsertPoints<'a> {
    points: Vec<WirePoint<'a>>,
}

#[derive(Serialize)]
struct WirePoint<'a> {
    id: u64,
    vector: &'a [f32],
    payload: &'a PointPayload,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: u64,
    with_payload: bool,
}
