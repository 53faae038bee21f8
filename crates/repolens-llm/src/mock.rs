//! Test-only mock embedding and completion backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::{CompletionBackend, CompletionFuture, EmbedFuture, Embedder, Message};

/// Deterministic embedder: hashes bytes into `dimension` buckets and normalizes.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub dimension: usize,
    pub fail: bool,
    /// Return at most this many vectors per call.
    pub max_vectors: Option<usize>,
    /// Fail every call whose input contains this text.
    pub fail_on: Option<String>,
    calls: Arc<AtomicUsize>,
    batch_sizes: Arc<Mutex<Vec<usize>>>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            dimension: 8,
            fail: false,
            max_vectors: None,
            fail_on: None,
            calls: Arc::new(AtomicUsize::new(0)),
            batch_sizes: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    #[must_use]
    pub fn with_max_vectors(mut self, max: usize) -> Self {
        self.max_vectors = Some(max);
        self
    }

    #[must_use]
    pub fn with_fail_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on = Some(needle.into());
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }

    #[must_use]
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension.max(1)];
        for (i, b) in text.bytes().enumerate() {
            let slot = (usize::from(b) + i) % v.len();
            v[slot] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        } else {
            v[0] = 1.0;
        }
        v
    }
}

impl Embedder for MockEmbedder {
    fn embed<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.batch_sizes.lock().unwrap().push(texts.len());
            if self.fail {
                return Err(LlmError::Other("mock embedding error".into()));
            }
            if let Some(ref needle) = self.fail_on
                && texts.iter().any(|t| t.contains(needle.as_str()))
            {
                return Err(LlmError::Other("mock embedding error".into()));
            }
            let take = self.max_vectors.unwrap_or(texts.len()).min(texts.len());
            Ok(texts[..take].iter().map(|t| self.vector_for(t)).collect())
        })
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

/// Completion backend that records the last request and replays a fixed reply.
#[derive(Debug, Clone)]
pub struct MockCompletion {
    pub response: serde_json::Value,
    pub fail: bool,
    last_messages: Arc<Mutex<Option<Vec<Message>>>>,
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self {
            response: serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "mock response"}}]
            }),
            fail: false,
            last_messages: Arc::new(Mutex::new(None)),
        }
    }
}

impl MockCompletion {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn last_messages(&self) -> Option<Vec<Message>> {
        self.last_messages.lock().unwrap().clone()
    }
}

impl CompletionBackend for MockCompletion {
    fn complete<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
        Box::pin(async move {
            *self.last_messages.lock().unwrap() = Some(messages.to_vec());
            if self.fail {
                return Err(LlmError::Other("mock completion error".into()));
            }
            Ok(self.response.clone())
        })
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn model(&self) -> &str {
        "mock-model"
    }
}
