//! Offline corpus indexing and the vector index adapter used at query time.
//!
//! A source tree is walked, filtered by extension, split into overlapping
//! character windows, embedded in batches and upserted into a vector
//! collection. Completed files are recorded in an append-only progress log so
//! interrupted runs resume at file granularity.

pub mod chunker;
pub mod error;
pub mod files;
pub mod in_memory_store;
pub mod indexer;
pub mod progress;
pub mod qdrant;
pub mod store;

pub use error::{IndexError, Result};
pub use indexer::{CorpusIndexer, IndexReport, IndexerConfig};
pub use progress::IndexProgress;
pub use store::{IndexStore, IndexedPoint, PointPayload, RetrievalHit, StoreError};
