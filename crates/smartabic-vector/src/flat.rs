use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use smartabic_core::error::Error;
use smartabic_core::traits::VectorIndex;
use smartabic_core::types::{Candidate, ChunkId};

/// Exact search: scores every stored vector against the query.
///
/// Row `i` holds the embedding of chunk `i`. Vectors are expected to be
/// L2-normalized already, so the inner product is the cosine similarity.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(vectors: Vec<Vec<f32>>) -> smartabic_core::error::Result<Self> {
        let dim = vectors.first().map(Vec::len).ok_or(Error::EmptyCorpus)?;
        if dim == 0 {
            return Err(Error::InvalidConfig("embeddings must have at least one dimension".into()));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(Error::DimensionMismatch { expected: dim, actual: bad.len() });
        }
        if ChunkId::try_from(vectors.len()).is_err() {
            return Err(Error::InvalidConfig(format!("{} vectors exceed the chunk id range", vectors.len())));
        }
        Ok(Self { dim, vectors })
    }

    /// Loads a JSON array of equally sized float arrays.
    pub fn load_json(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read embeddings {}", path.display()))?;
        let vectors: Vec<Vec<f32>> =
            serde_json::from_str(&raw).with_context(|| format!("Failed to parse embeddings {}", path.display()))?;
        let index = Self::new(vectors)?;
        info!(path = %path.display(), rows = index.len(), dim = index.dim, "flat index loaded");
        Ok(index)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl VectorIndex for FlatIndex {
    /// Ties keep ascending chunk id order.
    fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<Candidate>> {
        if query_vec.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query_vec.len() }.into());
        }
        let mut hits: Vec<Candidate> = self
            .vectors
            .iter()
            .zip(0..)
            .map(|(v, id)| Candidate::new(id, v.iter().zip(query_vec).map(|(a, b)| a * b).sum()))
            .collect();
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(k);
        Ok(hits)
    }
}
