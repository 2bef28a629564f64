//! smartabic-text
//!
//! Literal keyword extraction and overlap scoring used to rerank the
//! vector-search candidate pool.
pub mod keywords;
pub mod scorer;

pub use keywords::extract_keywords;
pub use scorer::KeywordScorer;
