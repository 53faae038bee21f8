//! Append-only log of completed files and coarse progress reporting.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::Result;

/// Set of relative paths already indexed, backed by a newline-delimited file.
#[derive(Debug)]
pub struct ProgressLog {
    path: PathBuf,
    done: HashSet<String>,
    file: tokio::fs::File,
}

impl ProgressLog {
    /// Load existing entries from `path`, creating the file if missing.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read or opened for appending.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let done = match tokio::fs::read(&path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_owned)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        tracing::debug!(path = %path.display(), entries = done.len(), "progress log loaded");
        Ok(Self { path, done, file })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn contains(&self, rel_path: &str) -> bool {
        self.done.contains(rel_path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.done.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Record `rel_path` as completed and flush it to disk.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the write or flush fails, or
    /// [`std::io::ErrorKind::InvalidInput`] if `rel_path` contains a line break.
    pub async fn append(&mut self, rel_path: &str) -> Result<()> {
        if self.done.contains(rel_path) {
            return Ok(());
        }
        if rel_path.contains(['\n', '\r']) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("progress log entry contains a line break: {rel_path:?}"),
            )
            .into());
        }
        self.file.write_all(format!("{rel_path}\n").as_bytes()).await?;
        self.file.flush().await?;
        self.file.sync_data().await?;
        self.done.insert(rel_path.to_owned());
        Ok(())
    }
}

/// Percentage-of-files-processed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexProgress {
    pub percent: u8,
    pub files_done: usize,
    pub files_total: usize,
}

/// Emits [`IndexProgress`] only when the whole-number percentage changes.
#[derive(Debug)]
pub struct ProgressReporter {
    total: usize,
    last_percent: Option<u8>,
    tx: Option<UnboundedSender<IndexProgress>>,
}

impl ProgressReporter {
    #[must_use]
    pub fn new(total: usize, tx: Option<UnboundedSender<IndexProgress>>) -> Self {
        Self {
            total,
            last_percent: None,
            tx,
        }
    }

    /// Report that `files_done` of the total have been handled. Returns the
    /// event if one was emitted.
    pub fn record(&mut self, files_done: usize) -> Option<IndexProgress> {
        let percent = percent_of(files_done, self.total);
        if self.last_percent == Some(percent) {
            return None;
        }
        self.last_percent = Some(percent);

        let event = IndexProgress {
            percent,
            files_done,
            files_total: self.total,
        };
        tracing::info!(percent, files_done, files_total = self.total, "indexing progress");
        if let Some(ref tx) = self.tx {
            // Receiver may have been dropped; progress is advisory.
            let _ = tx.send(event);
        }
        Some(event)
    }
}

fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = done.min(total).saturating_mul(100) / total;
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_missing_creates_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/progress");
        let log = ProgressLog::open(&path).await.unwrap();
        assert!(log.is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn append_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress");

        let mut log = ProgressLog::open(&path).await.unwrap();
        log.append("a.md").await.unwrap();
        log.append("dir/b.yaml").await.unwrap();
        log.append("a.md").await.unwrap();
        drop(log);

        let log = ProgressLog::open(&path).await.unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.contains("a.md"));
        assert!(log.contains("dir/b.yaml"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "a.md\ndir/b.yaml\n"
        );
    }

    #[tokio::test]
    async fn append_rejects_line_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress");
        let mut log = ProgressLog::open(&path).await.unwrap();
        assert_eq!(log.path(), path.as_path());

        let err = log.append("odd\nname.md").await.unwrap_err();
        assert!(matches!(
            err,
            crate::IndexError::Io(ref e) if e.kind() == std::io::ErrorKind::InvalidInput
        ));
        assert!(log.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn open_tolerates_blank_lines_and_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress");
        std::fs::write(&path, b"a.md\n\n  \nb\xff.md\n").unwrap();
        let log = ProgressLog::open(&path).await.unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.contains("a.md"));
    }

    #[test]
    fn reporter_deduplicates_percentages() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut reporter = ProgressReporter::new(300, Some(tx));
        assert!(reporter.record(0).is_some());
        assert!(reporter.record(1).is_none());
        assert!(reporter.record(2).is_none());
        assert_eq!(reporter.record(3).map(|p| p.percent), Some(1));
        assert_eq!(reporter.record(300).map(|p| p.percent), Some(100));

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event.percent);
        }
        assert_eq!(seen, vec![0, 1, 100]);
    }

    #[test]
    fn reporter_survives_dropped_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let mut reporter = ProgressReporter::new(2, Some(tx));
        assert!(reporter.record(1).is_some());
    }

    #[test]
    fn empty_tree_is_complete() {
        assert_eq!(percent_of(0, 0), 100);
        assert_eq!(percent_of(5, 4), 100);
    }
}
