//! `VectorIndex` backends.
//!
//! - [`FlatIndex`]: exact inner-product scan over in-memory embeddings.
//! - [`LanceVectorIndex`]: nearest-neighbour search over a pre-built LanceDB table.
pub mod flat;
pub mod lance;
pub mod schema;

pub use flat::FlatIndex;
pub use lance::LanceVectorIndex;
