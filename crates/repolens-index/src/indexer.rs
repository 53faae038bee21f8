//! Corpus indexing orchestrator: walk → chunk → embed → upsert → log.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use repolens_llm::Embedder;
use tokio::sync::mpsc::UnboundedSender;

use crate::chunker::{Chunk, ChunkerConfig, chunk_text};
use crate::error::{IndexError, Result};
use crate::files::{FileFilter, collect_files, relative_path};
use crate::progress::{IndexProgress, ProgressLog, ProgressReporter};
use crate::store::{IndexStore, IndexedPoint, PointPayload};

const PROBE_TEXT: &str = "dimension probe";

/// Indexer configuration.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub collection: String,
    pub chunker: ChunkerConfig,
    pub filter: FileFilter,
    /// Chunks sent per embedding request (default: 16).
    pub embed_batch_size: usize,
    /// Points buffered before an upsert is issued (default: 500).
    pub upsert_batch_size: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            collection: "repo_chunks".into(),
            chunker: ChunkerConfig::default(),
            filter: FileFilter::default(),
            embed_batch_size: 16,
            upsert_batch_size: 500,
        }
    }
}

impl IndexerConfig {
    /// # Errors
    ///
    /// Returns [`IndexError::Config`] on an invalid chunker or a zero batch size.
    pub fn validate(&self) -> Result<()> {
        self.chunker.validate()?;
        if self.embed_batch_size == 0 || self.upsert_batch_size == 0 {
            return Err(IndexError::Config("batch sizes must be positive".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(IndexError::Config("collection name is empty".into()));
        }
        Ok(())
    }
}

/// Summary of an indexing run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexReport {
    /// Eligible files found under the root.
    pub files_total: usize,
    /// Files completed and logged during this run.
    pub files_processed: usize,
    /// Files skipped because an earlier run logged them.
    pub files_skipped: usize,
    /// Unreadable files and files that produced no embeddings.
    pub files_failed: usize,
    pub chunks_created: usize,
    pub chunks_dropped: usize,
    pub points_upserted: usize,
    pub duration_ms: u64,
}

enum FileOutcome {
    Unreadable,
    Empty,
    NoEmbeddings { chunks: usize },
    Embedded {
        points: Vec<IndexedPoint>,
        chunks: usize,
        dropped: usize,
    },
}

/// Points waiting for upsert and the files whose completion depends on them.
#[derive(Default)]
struct PendingBatch {
    points: Vec<IndexedPoint>,
    paths: Vec<String>,
}

/// Orchestrates resumable indexing of a source tree.
pub struct CorpusIndexer {
    store: Arc<dyn IndexStore>,
    embedder: Arc<dyn Embedder>,
    config: IndexerConfig,
    progress_tx: Option<UnboundedSender<IndexProgress>>,
}

impl CorpusIndexer {
    #[must_use]
    pub fn new(
        store: Arc<dyn IndexStore>,
        embedder: Arc<dyn Embedder>,
        config: IndexerConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
            progress_tx: None,
        }
    }

    #[must_use]
    pub fn with_progress_tx(mut self, tx: UnboundedSender<IndexProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    #[must_use]
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Index every eligible file under `root` not already listed in the
    /// progress log at `log_path`.
    ///
    /// A path is appended to the log only once the points it contributed have
    /// been upserted, so the log never runs ahead of the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the collection cannot
    /// be bootstrapped, the progress log cannot be written, or an upsert fails
    /// ([`IndexError::IntegrityRisk`]).
    pub async fn index(&self, root: &Path, log_path: &Path) -> Result<IndexReport> {
        self.config.validate()?;
        let files: Vec<PathBuf> = collect_files(root, &self.config.filter)
            .into_iter()
            .filter(|p| p.as_path() != log_path)
            .collect();
        self.index_files(root, &files, log_path).await
    }

    /// Index `files` (absolute paths under `root`) in order.
    async fn index_files(
        &self,
        root: &Path,
        files: &[PathBuf],
        log_path: &Path,
    ) -> Result<IndexReport> {
        let start = std::time::Instant::now();
        self.ensure_collection().await?;
        let mut next_id = self.store.count(&self.config.collection).await? + 1;

        let mut log = ProgressLog::open(log_path).await?;

        let mut report = IndexReport {
            files_total: files.len(),
            ..IndexReport::default()
        };
        tracing::info!(
            root = %root.display(),
            log = %log.path().display(),
            files = report.files_total,
            already_indexed = log.len(),
            first_id = next_id,
            "indexing started"
        );

        let mut reporter = ProgressReporter::new(files.len(), self.progress_tx.clone());
        reporter.record(0);
        let mut pending = PendingBatch::default();

        for (i, file) in files.iter().enumerate() {
            let rel_path = relative_path(root, file);
            if log.contains(&rel_path) {
                report.files_skipped += 1;
                reporter.record(i + 1);
                continue;
            }

            match self.index_file(file, &rel_path, &mut next_id).await {
                FileOutcome::Unreadable => report.files_failed += 1,
                FileOutcome::Empty => {
                    report.files_processed += 1;
                    if pending.points.is_empty() {
                        log.append(&rel_path).await?;
                    } else {
                        pending.paths.push(rel_path);
                    }
                }
                FileOutcome::NoEmbeddings { chunks } => {
                    tracing::warn!(
                        file = %rel_path,
                        chunks,
                        "no embeddings produced, file not indexed"
                    );
                    report.files_failed += 1;
                    report.chunks_dropped += chunks;
                }
                FileOutcome::Embedded {
                    points,
                    chunks,
                    dropped,
                } => {
                    if dropped > 0 {
                        tracing::warn!(
                            file = %rel_path,
                            chunks,
                            dropped,
                            "embedding shortfall, trailing chunks dropped"
                        );
                    }
                    tracing::debug!(file = %rel_path, points = points.len(), "file embedded");
                    report.files_processed += 1;
                    report.chunks_created += chunks;
                    report.chunks_dropped += dropped;
                    pending.points.extend(points);
                    pending.paths.push(rel_path);
                }
            }

            if pending.points.len() >= self.config.upsert_batch_size {
                self.flush(&mut pending, &mut log, &mut report).await?;
            }
            reporter.record(i + 1);
        }

        self.flush(&mut pending, &mut log, &mut report).await?;

        report.duration_ms = start.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        tracing::info!(
            processed = report.files_processed,
            skipped = report.files_skipped,
            failed = report.files_failed,
            points = report.points_upserted,
            duration_ms = report.duration_ms,
            "indexing finished"
        );
        Ok(report)
    }

    /// Create the collection, sized from a probe embedding, if it is missing.
    async fn ensure_collection(&self) -> Result<()> {
        let collection = &self.config.collection;
        if self.store.exists(collection).await {
            return Ok(());
        }

        let probe = self.embedder.embed(&[PROBE_TEXT.to_owned()]).await?;
        let dimension = probe
            .first()
            .map(Vec::len)
            .filter(|d| *d > 0)
            .ok_or(IndexError::EmptyProbe)?;
        self.store
            .create(collection, u64::try_from(dimension)?)
            .await?;
        tracing::info!(collection = %collection, dimension, "collection created");
        Ok(())
    }

    async fn index_file(&self, path: &Path, rel_path: &str, next_id: &mut u64) -> FileOutcome {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(file = %rel_path, "failed to read file: {e}");
                return FileOutcome::Unreadable;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        let chunks = chunk_text(&text, rel_path, &self.config.chunker);
        if chunks.is_empty() {
            return FileOutcome::Empty;
        }

        let mut points = Vec::with_capacity(chunks.len());
        let mut dropped = 0usize;
        for batch in chunks.chunks(self.config.embed_batch_size) {
            let vectors = self.embed_batch(batch, rel_path).await;
            dropped += batch.len().saturating_sub(vectors.len());
            for (chunk, vector) in batch.iter().zip(vectors) {
                points.push(IndexedPoint {
                    id: *next_id,
                    vector,
                    payload: PointPayload {
                        text: chunk.text.clone(),
                        path: chunk.source_path.clone(),
                    },
                });
                *next_id += 1;
            }
        }

        if points.is_empty() {
            return FileOutcome::NoEmbeddings {
                chunks: chunks.len(),
            };
        }
        FileOutcome::Embedded {
            points,
            chunks: chunks.len(),
            dropped,
        }
    }

    /// Embed one batch; a failed call yields no vectors.
    async fn embed_batch(&self, batch: &[Chunk], rel_path: &str) -> Vec<Vec<f32>> {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        match self.embedder.embed(&texts).await {
            Ok(vectors) => vectors,
            Err(e) => {
                tracing::warn!(
                    file = %rel_path,
                    first_chunk = batch.first().map_or(0, |c| c.sequence_id),
                    "embedding batch failed: {e}"
                );
                Vec::new()
            }
        }
    }

    /// Upsert buffered points in batches, then commit the files they belong to.
    async fn flush(
        &self,
        pending: &mut PendingBatch,
        log: &mut ProgressLog,
        report: &mut IndexReport,
    ) -> Result<()> {
        let points = std::mem::take(&mut pending.points);
        let mut remaining = points.into_iter().peekable();
        while remaining.peek().is_some() {
            let batch: Vec<IndexedPoint> =
                remaining.by_ref().take(self.config.upsert_batch_size).collect();
            let size = batch.len();
            self.store
                .upsert(&self.config.collection, batch)
                .await
                .map_err(|source| {
                    tracing::error!(pending_files = pending.paths.len(), "upsert failed: {source}");
                    IndexError::IntegrityRisk {
                        source,
                        pending_files: pending.paths.len(),
                    }
                })?;
            report.points_upserted += size;
            tracing::debug!(points = size, "upserted batch");
        }

        for path in pending.paths.drain(..) {
            log.append(&path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use repolens_llm::mock::MockEmbedder;

    use super::*;
    use crate::in_memory_store::InMemoryIndexStore;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn small_chunks() -> IndexerConfig {
        IndexerConfig {
            chunker: ChunkerConfig {
                max_chars: 10,
                overlap: 2,
            },
            ..IndexerConfig::default()
        }
    }

    fn indexer(
        store: &Arc<InMemoryIndexStore>,
        embedder: &MockEmbedder,
        config: IndexerConfig,
    ) -> CorpusIndexer {
        CorpusIndexer::new(store.clone(), Arc::new(embedder.clone()), config)
    }

    fn log_lines(path: &Path) -> Vec<String> {
        let mut lines: Vec<String> = fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect();
        lines.sort();
        lines
    }

    fn sample_tree() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        write(&root, "manifests/init.pp", "class profile::base { include ntp }");
        write(&root, "hieradata/common.yaml", "logging: debug\nntp::servers: []\n");
        write(&root, "README.md", "Puppet control repository.");
        write(&root, "src/tool.rs", "fn main() {}");
        write(&root, ".git/HEAD.txt", "ref: refs/heads/main");
        (dir, root)
    }

    #[test]
    fn default_config() {
        let config = IndexerConfig::default();
        assert_eq!(config.collection, "repo_chunks");
        assert_eq!(config.embed_batch_size, 16);
        assert_eq!(config.upsert_batch_size, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_batch() {
        let config = IndexerConfig {
            embed_batch_size: 0,
            ..IndexerConfig::default()
        };
        assert!(matches!(config.validate(), Err(IndexError::Config(_))));
    }

    #[tokio::test]
    async fn bootstrap_sizes_collection_from_probe() {
        let (_dir, root) = sample_tree();
        let store = Arc::new(InMemoryIndexStore::new());
        let embedder = MockEmbedder::default().with_dimension(4);

        indexer(&store, &embedder, IndexerConfig::default())
            .index(&root, &root.join(".progress"))
            .await
            .unwrap();

        assert_eq!(store.dimension("repo_chunks"), Some(4));
    }

    #[tokio::test]
    async fn failed_probe_aborts_before_processing() {
        let (_dir, root) = sample_tree();
        let store = Arc::new(InMemoryIndexStore::new());
        let log = root.join(".progress");

        let err = indexer(&store, &MockEmbedder::failing(), IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap_err();

        assert!(matches!(err, IndexError::Embedding(_)));
        assert!(!store.exists("repo_chunks").await);
        assert!(log_lines(&log).is_empty());
    }

    #[tokio::test]
    async fn indexes_eligible_files_and_logs_them() {
        let (_dir, root) = sample_tree();
        let store = Arc::new(InMemoryIndexStore::new());
        let log = root.join(".progress");

        let report = indexer(&store, &MockEmbedder::default(), IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap();

        assert_eq!(report.files_total, 3);
        assert_eq!(report.files_processed, 3);
        assert_eq!(report.points_upserted, 3);
        assert_eq!(
            log_lines(&log),
            vec!["README.md", "hieradata/common.yaml", "manifests/init.pp"]
        );
        assert_eq!(
            store.paths("repo_chunks"),
            vec!["README.md", "hieradata/common.yaml", "manifests/init.pp"]
        );
        assert_eq!(store.ids("repo_chunks"), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily_and_indexed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("conf.yaml"), b"key: \xff\xfe value").unwrap();
        let store = Arc::new(InMemoryIndexStore::new());
        let embedder = MockEmbedder::default();
        let log = root.join(".progress");

        let report = indexer(&store, &embedder, IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap();

        assert_eq!(report.files_processed, 1);
        assert_eq!(report.files_failed, 0);
        assert_eq!(store.point_count("repo_chunks"), 1);
        assert_eq!(log_lines(&log), vec!["conf.yaml"]);

        let decoded = "key: \u{FFFD}\u{FFFD} value";
        let hits = store
            .search("repo_chunks", embedder.vector_for(decoded), 1, true)
            .await
            .unwrap();
        assert_eq!(hits[0].payload.text.as_deref(), Some(decoded));
    }

    #[tokio::test]
    async fn unreadable_file_is_failed_and_not_logged() {
        let (_dir, root) = sample_tree();
        let store = Arc::new(InMemoryIndexStore::new());
        let log = root.join(".progress");
        let files = vec![
            root.join("README.md"),
            root.join("removed-after-walk.md"),
            root.join("manifests/init.pp"),
        ];

        let report = indexer(&store, &MockEmbedder::default(), IndexerConfig::default())
            .index_files(&root, &files, &log)
            .await
            .unwrap();

        assert_eq!(report.files_total, 3);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.files_processed, 2);
        assert_eq!(log_lines(&log), vec!["README.md", "manifests/init.pp"]);
        assert_eq!(store.point_count("repo_chunks"), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn permission_denied_file_is_failed_and_not_logged() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, root) = sample_tree();
        let locked = root.join("manifests/init.pp");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&locked).is_ok() {
            // Privileged users bypass file modes.
            return;
        }
        let store = Arc::new(InMemoryIndexStore::new());
        let log = root.join(".progress");

        let report = indexer(&store, &MockEmbedder::default(), IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap();

        assert_eq!(report.files_failed, 1);
        assert_eq!(report.files_processed, 2);
        assert_eq!(log_lines(&log), vec!["README.md", "hieradata/common.yaml"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn newline_in_file_name_is_never_reindexed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        write(&root, "ok.md", "regular file");
        write(&root, "odd\nname.md", "awkward name");
        let store = Arc::new(InMemoryIndexStore::new());
        let embedder = MockEmbedder::default();
        let log = root.join(".progress");

        let first = indexer(&store, &embedder, IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap();
        let second = indexer(&store, &embedder, IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap();

        assert_eq!(first.files_processed, 1);
        assert_eq!(second.files_processed, 0);
        assert_eq!(second.files_skipped, 1);
        assert_eq!(store.point_count("repo_chunks"), 1);
        assert_eq!(log_lines(&log), vec!["ok.md"]);
    }

    #[tokio::test]
    async fn second_run_processes_nothing() {
        let (_dir, root) = sample_tree();
        let store = Arc::new(InMemoryIndexStore::new());
        let embedder = MockEmbedder::default();
        let log = root.join(".progress");
        let indexer = indexer(&store, &embedder, IndexerConfig::default());

        indexer.index(&root, &log).await.unwrap();
        let calls_after_first = embedder.calls();
        let report = indexer.index(&root, &log).await.unwrap();

        assert_eq!(report.files_processed, 0);
        assert_eq!(report.files_skipped, 3);
        assert_eq!(embedder.calls(), calls_after_first);
        assert_eq!(store.point_count("repo_chunks"), 3);
    }

    #[tokio::test]
    async fn resumed_run_matches_single_run() {
        let (_dir, root) = sample_tree();
        let full_store = Arc::new(InMemoryIndexStore::new());
        let full_log = root.join(".full");
        indexer(&full_store, &MockEmbedder::default(), IndexerConfig::default())
            .index(&root, &full_log)
            .await
            .unwrap();

        let store = Arc::new(InMemoryIndexStore::new());
        let log = root.join(".resumed");
        fs::write(&log, "README.md\n").unwrap();
        let report = indexer(&store, &MockEmbedder::default(), IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap();

        assert_eq!(report.files_processed, 2);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(log_lines(&log), log_lines(&full_log));
    }

    #[tokio::test]
    async fn new_points_do_not_overwrite_earlier_runs() {
        let (_dir, root) = sample_tree();
        let store = Arc::new(InMemoryIndexStore::new());
        let log = root.join(".progress");
        let indexer = indexer(&store, &MockEmbedder::default(), IndexerConfig::default());

        indexer.index(&root, &log).await.unwrap();
        write(&root, "docs/new.md", "added later");
        let report = indexer.index(&root, &log).await.unwrap();

        assert_eq!(report.files_processed, 1);
        assert_eq!(store.point_count("repo_chunks"), 4);
        assert_eq!(store.ids("repo_chunks"), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn empty_file_is_logged_without_points() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        write(&root, "empty.md", "");
        let store = Arc::new(InMemoryIndexStore::new());
        let log = root.join(".progress");

        let report = indexer(&store, &MockEmbedder::default(), IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap();

        assert_eq!(report.files_processed, 1);
        assert_eq!(report.points_upserted, 0);
        assert_eq!(log_lines(&log), vec!["empty.md"]);
    }

    #[tokio::test]
    async fn shortfall_drops_trailing_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        // 26 chars with size 10 / overlap 2 → 3 chunks.
        write(&root, "a.md", "abcdefghijklmnopqrstuvwxyz");
        let store = Arc::new(InMemoryIndexStore::new());
        let embedder = MockEmbedder::default().with_max_vectors(1);
        let log = root.join(".progress");

        let report = indexer(&store, &embedder, small_chunks())
            .index(&root, &log)
            .await
            .unwrap();

        assert_eq!(report.chunks_created, 3);
        assert_eq!(report.chunks_dropped, 2);
        assert_eq!(report.points_upserted, 1);
        assert_eq!(log_lines(&log), vec!["a.md"]);
    }

    #[tokio::test]
    async fn file_without_embeddings_is_not_logged() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        write(&root, "good.md", "fine content");
        write(&root, "bad.md", "BROKEN content");
        let store = Arc::new(InMemoryIndexStore::new());
        let embedder = MockEmbedder::default().with_fail_on("BROKEN");
        let log = root.join(".progress");

        let report = indexer(&store, &embedder, IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap();

        assert_eq!(report.files_processed, 1);
        assert_eq!(report.files_failed, 1);
        assert_eq!(log_lines(&log), vec!["good.md"]);
    }

    #[tokio::test]
    async fn embeds_in_fixed_batches() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        // 40 chunks of 10 chars with overlap 2: stride 8 → 8 * 39 + 10 chars.
        write(&root, "big.txt", &"x".repeat(8 * 39 + 10));
        let store = Arc::new(InMemoryIndexStore::new());
        let embedder = MockEmbedder::default();

        indexer(&store, &embedder, small_chunks())
            .index(&root, &root.join(".progress"))
            .await
            .unwrap();

        // First call is the dimension probe.
        assert_eq!(embedder.batch_sizes(), vec![1, 16, 16, 8]);
        assert_eq!(store.point_count("repo_chunks"), 40);
    }

    #[tokio::test]
    async fn flushes_when_buffer_reaches_batch_size() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        for i in 0..5 {
            write(&root, &format!("f{i}.md"), &format!("file number {i}"));
        }
        let store = Arc::new(InMemoryIndexStore::new());
        let config = IndexerConfig {
            upsert_batch_size: 2,
            ..IndexerConfig::default()
        };

        let report = indexer(&store, &MockEmbedder::default(), config)
            .index(&root, &root.join(".progress"))
            .await
            .unwrap();

        assert_eq!(store.upsert_calls(), 3);
        assert_eq!(report.points_upserted, 5);
    }

    #[tokio::test]
    async fn upsert_failure_aborts_without_logging() {
        let (_dir, root) = sample_tree();
        let store = Arc::new(InMemoryIndexStore::new());
        store.create("repo_chunks", 8).await.unwrap();
        store.set_fail_upserts(true);
        let log = root.join(".progress");

        let err = indexer(&store, &MockEmbedder::default(), IndexerConfig::default())
            .index(&root, &log)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IndexError::IntegrityRisk {
                pending_files: 3,
                ..
            }
        ));
        assert!(log_lines(&log).is_empty());
    }

    #[tokio::test]
    async fn reports_progress_over_channel() {
        let (_dir, root) = sample_tree();
        let store = Arc::new(InMemoryIndexStore::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        indexer(&store, &MockEmbedder::default(), IndexerConfig::default())
            .with_progress_tx(tx)
            .index(&root, &root.join(".progress"))
            .await
            .unwrap();

        let mut percents = Vec::new();
        while let Ok(event) = rx.try_recv() {
            percents.push(event.percent);
        }
        assert_eq!(percents, vec![0, 33, 66, 100]);
    }
}
