use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const CHUNK_ID_COL: &str = "chunk_id";
pub const CONTENT_COL: &str = "content";
pub const VECTOR_COL: &str = "vector";
pub const DISTANCE_COL: &str = "_distance";

/// Layout of the pre-built chunk table: one row per corpus chunk.
pub fn build_chunk_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new(CHUNK_ID_COL, DataType::Int32, false),
		Field::new(CONTENT_COL, DataType::Utf8, false),
		Field::new(VECTOR_COL, DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}
