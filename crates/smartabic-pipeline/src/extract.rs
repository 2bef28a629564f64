use smartabic_core::settings::QaSettings;
use smartabic_core::types::{Answer, RankedResult};

/// Confidence gate plus sentence trimming of the top-ranked chunk.
#[derive(Debug, Clone)]
pub struct AnswerExtractor {
    threshold: f32,
    refusal_message: String,
    delimiters: Vec<char>,
    min_answer_chars: usize,
    fallback_chars: usize,
}

impl AnswerExtractor {
    pub fn from_settings(settings: &QaSettings) -> Self {
        Self {
            threshold: settings.dont_know_threshold,
            refusal_message: settings.refusal_message.clone(),
            delimiters: settings.sentence_delimiters.clone(),
            min_answer_chars: settings.min_answer_chars,
            fallback_chars: settings.fallback_chars,
        }
    }

    /// `best_score` is the similarity of `ranked[0]`, not its keyword score.
    pub fn extract(&self, ranked: &[RankedResult<'_>]) -> Answer {
        let best_score = ranked.first().map_or(0.0, RankedResult::similarity);
        match ranked.first() {
            Some(top) if best_score >= self.threshold => Answer {
                text: self.trim_to_sentence(top.text),
                confidence: best_score,
                refused: false,
            },
            _ => Answer { text: self.refusal_message.clone(), confidence: best_score, refused: true },
        }
    }

    /// Cuts at the highest-priority delimiter present anywhere in the text,
    /// even when a lower-priority one occurs earlier.
    pub fn trim_to_sentence(&self, chunk: &str) -> String {
        let text = chunk.trim();
        let fallback = || truncate_chars(text, self.fallback_chars).trim();
        let sentence = match self.delimiters.iter().find(|d| text.contains(**d)) {
            Some(d) => text.split_once(*d).map_or(text, |(head, _)| head).trim(),
            // Capped, not whole: an undelimited chunk yields its first `fallback_chars`.
            None => fallback(),
        };
        if sentence.chars().count() < self.min_answer_chars { fallback().to_string() } else { sentence.to_string() }
    }
}

/// The first `n` characters (not bytes) of `s`.
fn truncate_chars(s: &str, n: usize) -> &str {
    s.char_indices().nth(n).map_or(s, |(end, _)| &s[..end])
}
