//! Turns a question into a normalized query vector.
//!
//! E5 models are trained with asymmetric prefixes: stored passages were
//! embedded as `passage: ...`, so questions must be embedded as `query: ...`
//! to land in the same space.
use anyhow::{anyhow, Result};

use smartabic_core::traits::Embedder;

pub struct QueryEncoder {
    embedder: Box<dyn Embedder>,
    prefix: String,
}

impl QueryEncoder {
    pub fn new(embedder: Box<dyn Embedder>, prefix: impl Into<String>) -> Self {
        Self { embedder, prefix: prefix.into() }
    }

    pub fn dim(&self) -> usize {
        self.embedder.dim()
    }

    /// The exact text handed to the embedder for `question`.
    pub fn query_text(&self, question: &str) -> String {
        format!("{}{}", self.prefix, question.trim())
    }

    /// Empty or whitespace-only questions are encoded like any other.
    pub fn encode(&self, question: &str) -> Result<Vec<f32>> {
        let mut vec = self
            .embedder
            .embed_batch(&[self.query_text(question)])?
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector"))?;
        l2_normalize(&mut vec);
        Ok(vec)
    }
}

/// Scales `v` to unit length in place. A zero vector is left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() { *x /= norm; }
    }
}
