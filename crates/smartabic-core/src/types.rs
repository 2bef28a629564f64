//! Domain types shared by the encoder, index backends and the answer pipeline.

use serde::{Deserialize, Serialize};

/// Position of a chunk inside the corpus. Stable for the process lifetime.
pub type ChunkId = u32;

/// One hit returned by a [`VectorIndex`](crate::traits::VectorIndex).
///
/// `similarity` is the inner product of two L2-normalized vectors, so it
/// lives roughly in `[-1, 1]` and higher is always better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub chunk_id: ChunkId,
    pub similarity: f32,
}

impl Candidate {
    pub fn new(chunk_id: ChunkId, similarity: f32) -> Self {
        Self { chunk_id, similarity }
    }
}

/// A candidate after keyword reranking, borrowing its chunk text from the corpus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedResult<'a> {
    pub candidate: Candidate,
    pub keyword_score: usize,
    pub text: &'a str,
}

impl RankedResult<'_> {
    pub fn similarity(&self) -> f32 {
        self.candidate.similarity
    }
}

/// Output of the answer extractor.
///
/// `confidence` is the similarity of the top-ranked result (0.0 when there
/// were no results). `refused` is set when the confidence gate rejected the
/// question and `text` holds the refusal message.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub confidence: f32,
    pub refused: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// The response handed back to the transport layer.
///
/// `chunks` and `scores` are parallel: same length, same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub best_score: f32,
    pub chunks: Vec<String>,
    pub scores: Vec<f32>,
}
