use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Anything that is not a word character, whitespace, or in the Arabic block.
///
/// The Arabic block includes punctuation such as `؟` and `،`, so those stay
/// glued to the word they follow.
static NON_KEYWORD_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\x{0600}-\x{06FF}]").expect("keyword filter regex is valid"));

pub const MIN_KEYWORD_CHARS: usize = 3;

/// Salient tokens of `text`, in first-occurrence order and without duplicates.
pub fn extract_keywords<S: AsRef<str>>(text: &str, stop_words: &[S]) -> Vec<String> {
    let cleaned = NON_KEYWORD_CHARS.replace_all(text, " ");
    let mut seen = HashSet::new();
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|w| !stop_words.iter().any(|s| s.as_ref() == *w))
        .filter(|w| seen.insert(*w))
        .map(str::to_string)
        .collect()
}
