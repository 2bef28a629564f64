//! smartabic-pipeline
//!
//! Question in, answer out: encode the question, pull a wide candidate pool
//! from the vector index, rerank it by keyword overlap, then gate and trim
//! the top passage.
use anyhow::Result;
use tracing::debug;

use smartabic_core::settings::QaSettings;
use smartabic_core::traits::{ChunkStore, VectorIndex};
use smartabic_core::types::{AskRequest, AskResponse, RankedResult};
use smartabic_embed::QueryEncoder;
use smartabic_text::KeywordScorer;

pub mod extract;
pub mod rerank;

pub use extract::AnswerExtractor;
pub use rerank::Reranker;

/// Process-wide context: built once at startup, read-only afterwards, and
/// safe to share across request threads.
pub struct QaPipeline {
    encoder: QueryEncoder,
    index: Box<dyn VectorIndex>,
    chunks: Box<dyn ChunkStore>,
    settings: QaSettings,
    reranker: Reranker,
    extractor: AnswerExtractor,
}

impl QaPipeline {
    pub fn new(encoder: QueryEncoder, index: Box<dyn VectorIndex>, chunks: Box<dyn ChunkStore>, settings: QaSettings) -> Self {
        let reranker = Reranker::new(settings.top_k);
        let extractor = AnswerExtractor::from_settings(&settings);
        Self { encoder, index, chunks, settings, reranker, extractor }
    }

    pub fn settings(&self) -> &QaSettings {
        &self.settings
    }

    /// Candidate search plus keyword reranking, without answer extraction.
    pub fn retrieve(&self, question: &str) -> Result<Vec<RankedResult<'_>>> {
        let question = question.trim();
        let query_vec = self.encoder.encode(question)?;
        let mut candidates = self.index.search(&query_vec, self.settings.search_k)?;
        candidates.truncate(self.settings.search_k);

        let scorer = KeywordScorer::new(question, self.settings.stop_words.as_slice());
        let pool = candidates
            .into_iter()
            .map(|c| Ok((c, self.chunks.chunk_at(c.chunk_id)?)))
            .collect::<Result<Vec<_>>>()?;
        let pool_size = pool.len();
        let ranked = self.reranker.rerank(pool, &scorer);
        debug!(keywords = scorer.keywords().len(), pool_size, ranked = ranked.len(), "reranked candidates");
        Ok(ranked)
    }

    pub fn ask(&self, question: &str) -> Result<AskResponse> {
        let question = question.trim();
        let ranked = self.retrieve(question)?;
        let answer = self.extractor.extract(&ranked);
        if answer.refused {
            debug!(best_score = answer.confidence, threshold = self.settings.dont_know_threshold, "below confidence threshold");
        }
        Ok(AskResponse {
            question: question.to_string(),
            answer: answer.text,
            best_score: answer.confidence,
            chunks: ranked.iter().map(|r| r.text.to_string()).collect(),
            scores: ranked.iter().map(RankedResult::similarity).collect(),
        })
    }

    pub fn handle(&self, request: &AskRequest) -> Result<AskResponse> {
        self.ask(&request.question)
    }
}
