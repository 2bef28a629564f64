use crate::types::{Candidate, ChunkId};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Nearest-neighbour search over precomputed chunk embeddings.
///
/// Returns at most `k` candidates ordered by descending similarity as the
/// backend sees it. Approximate backends are allowed to miss the exact
/// global top-k.
pub trait VectorIndex: Send + Sync {
    fn search(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<Candidate>>;
}

/// Read-only access to chunk texts by position.
pub trait ChunkStore: Send + Sync {
    fn len(&self) -> usize;
    fn chunk_at(&self, id: ChunkId) -> crate::error::Result<&str>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
