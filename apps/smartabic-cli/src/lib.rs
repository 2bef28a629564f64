//! Startup wiring shared by the `smartabic` binary and its tests.
use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use smartabic_core::config::Config;
use smartabic_core::corpus::Corpus;
use smartabic_core::error::Error;
use smartabic_core::traits::{ChunkStore, VectorIndex};
use smartabic_embed::{get_default_embedder, QueryEncoder, DEFAULT_MAX_LEN};
use smartabic_pipeline::QaPipeline;
use smartabic_vector::{FlatIndex, LanceVectorIndex};

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Loads the embedder, index and corpus named by `config` and wires them into a pipeline.
///
/// Any failure here is fatal: the process should not start serving.
pub fn build_pipeline(config: &Config) -> Result<QaPipeline> {
    let settings = config.qa_settings()?;
    let backend: String = config.get("data.backend").unwrap_or_else(|_| "flat".to_string());
    let model_dir = config.path("embedding.model_dir").ok();
    let max_len: usize = config.get("embedding.max_len").unwrap_or(DEFAULT_MAX_LEN);
    let embedder = get_default_embedder(model_dir.as_deref(), max_len)?;
    let dim = embedder.dim();

    let (index, chunks, index_dim, rows): (Box<dyn VectorIndex>, Box<dyn ChunkStore>, usize, usize) = match backend.as_str() {
        "flat" => {
            let corpus = Corpus::load_json(&config.path("data.corpus_path")?)?;
            let index = FlatIndex::load_json(&config.path("data.embeddings_path")?)?;
            let (index_dim, rows) = (index.dim(), index.len());
            (Box::new(index) as Box<dyn VectorIndex>, Box::new(corpus) as Box<dyn ChunkStore>, index_dim, rows)
        }
        "lance" => {
            let dir = config.path("data.lancedb_dir")?;
            let table: String = config.get("data.table").unwrap_or_else(|_| "chunks".to_string());
            let index = LanceVectorIndex::open(&dir.to_string_lossy(), &table)?;
            let corpus = index.load_corpus()?;
            let (index_dim, rows) = (index.dim(), corpus.len());
            (Box::new(index) as Box<dyn VectorIndex>, Box::new(corpus) as Box<dyn ChunkStore>, index_dim, rows)
        }
        other => bail!(Error::InvalidConfig(format!("unknown data.backend '{other}' (expected 'flat' or 'lance')"))),
    };

    if index_dim != dim {
        bail!(Error::DimensionMismatch { expected: dim, actual: index_dim });
    }
    if rows != chunks.len() {
        bail!(Error::InvalidConfig(format!("index has {rows} vectors but corpus has {} chunks", chunks.len())));
    }
    info!(backend = %backend, chunks = chunks.len(), dim, top_k = settings.top_k, search_k = settings.search_k, "pipeline ready");

    let encoder = QueryEncoder::new(embedder, settings.query_prefix.clone());
    Ok(QaPipeline::new(encoder, index, chunks, settings))
}

/// One question per line until `exit`, `quit` or EOF. A failed question is
/// reported on stderr and the session continues.
pub fn chat<R: BufRead, W: Write>(pipeline: &QaPipeline, input: R, mut out: W) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        let question = line.trim();
        if matches!(question, "exit" | "quit") { break; }
        if !question.is_empty() {
            match pipeline.ask(question) {
                Ok(response) => writeln!(out, "{}\n(confidence {:.3})", response.answer, response.best_score)?,
                Err(e) => eprintln!("Error: {:#}", e),
            }
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    Ok(())
}
