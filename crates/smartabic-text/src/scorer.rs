use crate::keywords::extract_keywords;

/// Scores chunks by how many of the question's keywords they contain.
///
/// Matching is a literal substring test, not a whole-word match: the keyword
/// `فرن` counts as present in a chunk that only mentions `فرنسا`.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    keywords: Vec<String>,
}

impl KeywordScorer {
    pub fn new<S: AsRef<str>>(question: &str, stop_words: &[S]) -> Self {
        Self { keywords: extract_keywords(question, stop_words) }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Number of distinct keywords occurring anywhere in `chunk`.
    pub fn score(&self, chunk: &str) -> usize {
        self.keywords.iter().filter(|k| chunk.contains(k.as_str())).count()
    }
}
