//! Fixed-size character windows with overlap.

use crate::error::{IndexError, Result};

/// One window of a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Path relative to the indexed root.
    pub source_path: String,
    /// Position of this chunk within its file, starting at 0.
    pub sequence_id: usize,
}

/// Chunker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Maximum chunk length in characters (default: 1500).
    pub max_chars: usize,
    /// Characters shared by consecutive chunks (default: 200).
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chars: 1500,
            overlap: 200,
        }
    }
}

impl ChunkerConfig {
    /// # Errors
    ///
    /// Returns [`IndexError::Config`] if `max_chars` is zero or `overlap` is not
    /// strictly smaller than `max_chars`.
    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(IndexError::Config("chunk size must be positive".into()));
        }
        if self.overlap >= self.max_chars {
            return Err(IndexError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.max_chars
            )));
        }
        Ok(())
    }
}

/// Split `text` into windows of at most `max_chars` characters.
///
/// Each window after the first starts `overlap` characters before the end of
/// the previous one; the last window ends exactly at the end of the text.
/// Empty text yields no chunks. Expects a validated config.
#[must_use]
pub fn chunk_text(text: &str, source_path: &str, config: &ChunkerConfig) -> Vec<Chunk> {
    // Byte offset of every char boundary, plus the end of the text.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let n = boundaries.len() - 1;
    let max_chars = config.max_chars.max(1);
    let overlap = config.overlap.min(max_chars - 1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + max_chars).min(n);
        chunks.push(Chunk {
            text: text[boundaries[start]..boundaries[end]].to_owned(),
            source_path: source_path.to_owned(),
            sequence_id: chunks.len(),
        });
        if end == n {
            break;
        }
        start = end - overlap;
    }
    chunks
}
