//! The ordered, immutable set of chunk texts answers are drawn from.
//!
//! A corpus is built once at startup, either from an in-memory list or from a
//! JSON file holding an array of strings, and is never modified afterwards.
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Error;
use crate::traits::ChunkStore;
use crate::types::ChunkId;

#[derive(Debug, Clone)]
pub struct Corpus {
    chunks: Vec<String>,
}

impl Corpus {
    /// Wraps `chunks`; chunk `i` gets id `i`. Rejects an empty list.
    pub fn from_chunks(chunks: Vec<String>) -> crate::error::Result<Self> {
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        if u32::try_from(chunks.len()).is_err() {
            return Err(Error::InvalidConfig(format!("corpus of {} chunks exceeds the id range", chunks.len())));
        }
        Ok(Self { chunks })
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("Failed to read corpus {}", path.display()))?;
        let chunks: Vec<String> =
            serde_json::from_str(&raw).with_context(|| format!("Failed to parse corpus {}", path.display()))?;
        let corpus = Self::from_chunks(chunks)?;
        info!(path = %path.display(), chunks = corpus.len(), "corpus loaded");
        Ok(corpus)
    }
}

impl ChunkStore for Corpus {
    fn len(&self) -> usize {
        self.chunks.len()
    }

    fn chunk_at(&self, id: ChunkId) -> crate::error::Result<&str> {
        self.chunks
            .get(id as usize)
            .map(String::as_str)
            .ok_or(Error::ChunkOutOfRange { id, len: self.chunks.len() })
    }
}
