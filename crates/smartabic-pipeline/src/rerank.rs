use std::cmp::Ordering;

use smartabic_core::types::{Candidate, RankedResult};
use smartabic_text::KeywordScorer;

/// Reorders the similarity-ordered candidate pool by keyword overlap.
#[derive(Debug, Clone, Copy)]
pub struct Reranker {
    top_k: usize,
}

impl Reranker {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Sorts by keyword score, then similarity, both descending, and keeps
    /// the first `top_k`.
    ///
    /// The sort is stable: candidates with equal keys stay in the order the
    /// index returned them.
    pub fn rerank<'a>(&self, pool: Vec<(Candidate, &'a str)>, scorer: &KeywordScorer) -> Vec<RankedResult<'a>> {
        let mut ranked: Vec<RankedResult<'a>> = pool
            .into_iter()
            .map(|(candidate, text)| RankedResult { candidate, keyword_score: scorer.score(text), text })
            .collect();
        ranked.sort_by(compare_desc);
        ranked.truncate(self.top_k);
        ranked
    }
}

fn compare_desc(a: &RankedResult<'_>, b: &RankedResult<'_>) -> Ordering {
    b.keyword_score
        .cmp(&a.keyword_score)
        .then_with(|| b.similarity().total_cmp(&a.similarity()))
}
