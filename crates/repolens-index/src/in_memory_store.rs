use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::store::{
    BoxFuture, HitPayload, IndexStore, IndexedPoint, PointPayload, RetrievalHit, StoreError,
};

struct InMemoryCollection {
    dimension: u64,
    points: BTreeMap<u64, (Vec<f32>, PointPayload)>,
}

/// Process-local [`IndexStore`] with brute-force cosine search.
pub struct InMemoryIndexStore {
    collections: RwLock<HashMap<String, InMemoryCollection>>,
    fail_upserts: AtomicBool,
    fail_search: AtomicBool,
    upsert_calls: AtomicUsize,
}

impl InMemoryIndexStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            fail_upserts: AtomicBool::new(false),
            fail_search: AtomicBool::new(false),
            upsert_calls: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent upsert fail.
    pub fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent search fail.
    pub fn set_fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn dimension(&self, collection: &str) -> Option<u64> {
        let cols = self.collections.read().ok()?;
        cols.get(collection).map(|c| c.dimension)
    }

    #[must_use]
    pub fn point_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .ok()
            .and_then(|cols| cols.get(collection).map(|c| c.points.len()))
            .unwrap_or(0)
    }

    /// Point ids currently stored, ascending.
    #[must_use]
    pub fn ids(&self, collection: &str) -> Vec<u64> {
        self.collections
            .read()
            .ok()
            .and_then(|cols| cols.get(collection).map(|c| c.points.keys().copied().collect()))
            .unwrap_or_default()
    }

    /// Distinct source paths with at least one stored point, sorted.
    #[must_use]
    pub fn paths(&self, collection: &str) -> Vec<String> {
        let Ok(cols) = self.collections.read() else {
            return Vec::new();
        };
        let Some(col) = cols.get(collection) else {
            return Vec::new();
        };
        let mut paths: Vec<String> = col.points.values().map(|(_, p)| p.path.clone()).collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

impl Default for InMemoryIndexStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryIndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryIndexStore").finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl IndexStore for InMemoryIndexStore {
    fn exists(&self, collection: &str) -> BoxFuture<'_, bool> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.collections
                .read()
                .is_ok_and(|cols| cols.contains_key(&collection))
        })
    }

    fn create(&self, collection: &str, dimension: u64) -> BoxFuture<'_, Result<(), StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| StoreError::Collection(e.to_string()))?;
            cols.entry(collection).or_insert_with(|| InMemoryCollection {
                dimension,
                points: BTreeMap::new(),
            });
            Ok(())
        })
    }

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<u64, StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| StoreError::Collection(e.to_string()))?;
            let col = cols.get(&collection).ok_or_else(|| {
                StoreError::Collection(format!("collection {collection} not found"))
            })?;
            u64::try_from(col.points.len()).map_err(|e| StoreError::Collection(e.to_string()))
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<IndexedPoint>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.upsert_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_upserts.load(Ordering::SeqCst) {
                return Err(StoreError::Upsert("injected upsert failure".into()));
            }
            let mut cols = self
                .collections
                .write()
                .map_err(|e| StoreError::Upsert(e.to_string()))?;
            let col = cols
                .get_mut(&collection)
                .ok_or_else(|| StoreError::Upsert(format!("collection {collection} not found")))?;
            for p in points {
                col.points.insert(p.id, (p.vector, p.payload));
            }
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
            if self.fail_search.load(Ordering::SeqCst) {
                return Err(StoreError::Search("injected search failure".into()));
            }
            let cols = self
                .collections
                .read()
                .map_err(|e| StoreError::Search(e.to_string()))?;
            let col = cols
                .get(&collection)
                .ok_or_else(|| StoreError::Search(format!("collection {collection} not found")))?;

            let mut hits: Vec<RetrievalHit> = col
                .points
                .values()
                .map(|(v, payload)| RetrievalHit {
                    score: cosine_similarity(&vector, v),
                    payload: if with_payload {
                        HitPayload {
                            text: Some(payload.text.clone()),
                            path: Some(payload.path.clone()),
                        }
                    } else {
                        HitPayload::default()
                    },
                })
                .collect();

            hits.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            hits.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(hits)
        })
    }
}
