//! Tunables of the retrieval-and-answer pipeline.
//!
//! Every field defaults to the constant the service has always shipped with;
//! a `[qa]` table in `config.toml` may override any subset of them.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const QUERY_PREFIX: &str = "query: ";
pub const TOP_K: usize = 5;
pub const SEARCH_K: usize = 80;
pub const DONT_KNOW_THRESHOLD: f32 = 0.72;
pub const MIN_ANSWER_CHARS: usize = 18;
pub const FALLBACK_CHARS: usize = 220;

pub const REFUSAL_MESSAGE: &str =
    "لا أعلم، ليس لدي معلومات كافية عن هذا السؤال حاليًا، لكنني في مرحلة التطوير.";

/// Ordered by precedence, not by position in the text.
pub const SENTENCE_DELIMITERS: [char; 5] = ['۔', '.', '!', '؟', '\n'];

pub const STOP_WORDS: [&str; 23] = [
    "ما", "هي", "هل", "أين", "من", "في", "على", "إلى", "عن", "هذا", "هذه", "ذلك", "تكون", "يكون",
    "كم", "متى", "لماذا", "كيف", "ماهو", "ماهي", "هو", "هي", "؟",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaSettings {
    /// Marker the embedding space expects in front of queries (E5 convention).
    pub query_prefix: String,
    pub top_k: usize,
    /// Width of the candidate pool handed to the keyword reranker.
    pub search_k: usize,
    pub dont_know_threshold: f32,
    pub refusal_message: String,
    pub stop_words: Vec<String>,
    pub sentence_delimiters: Vec<char>,
    pub min_answer_chars: usize,
    pub fallback_chars: usize,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            query_prefix: QUERY_PREFIX.to_string(),
            top_k: TOP_K,
            search_k: SEARCH_K,
            dont_know_threshold: DONT_KNOW_THRESHOLD,
            refusal_message: REFUSAL_MESSAGE.to_string(),
            stop_words: STOP_WORDS.iter().map(|s| (*s).to_string()).collect(),
            sentence_delimiters: SENTENCE_DELIMITERS.to_vec(),
            min_answer_chars: MIN_ANSWER_CHARS,
            fallback_chars: FALLBACK_CHARS,
        }
    }
}

impl QaSettings {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("qa.top_k must be at least 1".into()));
        }
        if self.search_k == 0 {
            return Err(Error::InvalidConfig("qa.search_k must be at least 1".into()));
        }
        if !self.dont_know_threshold.is_finite() {
            return Err(Error::InvalidConfig("qa.dont_know_threshold must be finite".into()));
        }
        if self.sentence_delimiters.is_empty() {
            return Err(Error::InvalidConfig("qa.sentence_delimiters must not be empty".into()));
        }
        Ok(())
    }
}
