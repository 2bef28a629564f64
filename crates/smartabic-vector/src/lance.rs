//! LanceDB-backed search over a pre-built chunk table.
//!
//! The table is produced offline and only read here. Each instance owns a
//! private tokio runtime and blocks on it, so it must not be used from inside
//! another tokio runtime.
use anyhow::{anyhow, bail, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::{Float32Type, Int32Type};
use arrow_schema::DataType;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{connect, DistanceType, Table};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use smartabic_core::corpus::Corpus;
use smartabic_core::error::Error;
use smartabic_core::traits::VectorIndex;
use smartabic_core::types::{Candidate, ChunkId};

use crate::schema::{CHUNK_ID_COL, CONTENT_COL, DISTANCE_COL, VECTOR_COL};

pub struct LanceVectorIndex {
	rt: Runtime,
	table: Table,
	dim: usize,
}

impl LanceVectorIndex {
	pub fn open(uri: &str, table_name: &str) -> Result<Self> {
		let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
		let table = rt.block_on(async {
			let db = connect(uri).execute().await?;
			db.open_table(table_name).execute().await
		})?;
		let schema = rt.block_on(table.schema())?;
		let dim = match schema.field_with_name(VECTOR_COL)?.data_type() {
			DataType::FixedSizeList(_, d) => usize::try_from(*d)?,
			other => bail!("column '{}' must be a fixed size list, found {:?}", VECTOR_COL, other),
		};
		info!(uri, table = table_name, dim, "lance index opened");
		Ok(Self { rt, table, dim })
	}

	pub fn dim(&self) -> usize { self.dim }

	/// Reads every `(chunk_id, content)` row back into a [`Corpus`].
	///
	/// Chunk ids must cover `0..n` exactly, so that search hits can be
	/// resolved by position.
	pub fn load_corpus(&self) -> Result<Corpus> {
		let mut rows: Vec<(i32, String)> = self.rt.block_on(async {
			let mut stream = self.table.query().select(Select::columns(&[CHUNK_ID_COL, CONTENT_COL])).execute().await?;
			let mut rows = Vec::new();
			while let Some(batch) = stream.try_next().await? {
				let ids = batch.column_by_name(CHUNK_ID_COL).and_then(|c| c.as_primitive_opt::<Int32Type>())
					.ok_or_else(|| anyhow!("{} column missing", CHUNK_ID_COL))?;
				let contents = batch.column_by_name(CONTENT_COL).and_then(|c| c.as_string_opt::<i32>())
					.ok_or_else(|| anyhow!("{} column missing", CONTENT_COL))?;
				for i in 0..batch.num_rows() { rows.push((ids.value(i), contents.value(i).to_string())); }
			}
			Ok::<_, anyhow::Error>(rows)
		})?;
		rows.sort_by_key(|(id, _)| *id);
		for (pos, (id, _)) in rows.iter().enumerate() {
			if usize::try_from(*id).ok() != Some(pos) {
				bail!("chunk ids must be contiguous from 0; found {} at position {}", id, pos);
			}
		}
		let corpus = Corpus::from_chunks(rows.into_iter().map(|(_, text)| text).collect())?;
		info!(chunks = smartabic_core::traits::ChunkStore::len(&corpus), "corpus loaded from lance table");
		Ok(corpus)
	}
}

impl VectorIndex for LanceVectorIndex {
	fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<Candidate>> {
		if query_vec.len() != self.dim {
			return Err(Error::DimensionMismatch { expected: self.dim, actual: query_vec.len() }.into());
		}
		if k == 0 { return Ok(Vec::new()); }
		let mut hits = self.rt.block_on(async {
			let mut stream = self.table.vector_search(query_vec.to_vec())?
				.distance_type(DistanceType::Cosine)
				.limit(k)
				.select(Select::columns(&[CHUNK_ID_COL]))
				.execute().await?;
			let mut hits = Vec::new();
			while let Some(batch) = stream.try_next().await? {
				let ids = batch.column_by_name(CHUNK_ID_COL).and_then(|c| c.as_primitive_opt::<Int32Type>())
					.ok_or_else(|| anyhow!("{} column missing", CHUNK_ID_COL))?;
				let distances = batch.column_by_name(DISTANCE_COL).and_then(|c| c.as_primitive_opt::<Float32Type>())
					.ok_or_else(|| anyhow!("{} column missing", DISTANCE_COL))?;
				for i in 0..batch.num_rows() {
					let id = ChunkId::try_from(ids.value(i))?;
					hits.push(Candidate::new(id, 1.0 - distances.value(i)));
				}
			}
			Ok::<_, anyhow::Error>(hits)
		})?;
		hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
		hits.truncate(k);
		debug!(k, hits = hits.len(), "lance search");
		Ok(hits)
	}
}
