use std::fs;
use std::path::Path;

use smartabic_cli::build_pipeline;
use smartabic_core::config::Config;
use smartabic_core::settings::REFUSAL_MESSAGE;
use smartabic_core::traits::Embedder;
use smartabic_embed::{FakeEmbedder, FAKE_DIM};

const CHUNKS: [&str; 3] = ["نص عن الطقس في الشتاء.", "عاصمة فرنسا هي باريس.", "الطعام الفرنسي مشهور."];
const QUESTION: &str = "عاصمة فرنسا";

fn fake_mode() {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
}

/// Chunk 1 is embedded from the exact query text so it scores 1.0.
fn write_flat_fixture(dir: &Path, dim: usize, rows: usize, backend: &str) -> std::path::PathBuf {
    let embedder = FakeEmbedder::new(dim);
    let texts: Vec<String> = CHUNKS
        .iter()
        .enumerate()
        .take(rows)
        .map(|(i, c)| if i == 1 { format!("query: {QUESTION}") } else { format!("passage: {c}") })
        .collect();
    let vectors = embedder.embed_batch(&texts).unwrap();

    fs::write(dir.join("chunks.json"), serde_json::to_string(&CHUNKS).unwrap()).unwrap();
    fs::write(dir.join("embeddings.json"), serde_json::to_string(&vectors).unwrap()).unwrap();
    let config = format!(
        "[data]\nbackend = \"{backend}\"\ncorpus_path = \"chunks.json\"\nembeddings_path = \"embeddings.json\"\n\n[qa]\ntop_k = 2\n"
    );
    let path = dir.join("config.toml");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn flat_backend_answers_from_best_chunk() {
    fake_mode();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::from_file(&write_flat_fixture(dir.path(), FAKE_DIM, 3, "flat")).unwrap();
    let pipeline = build_pipeline(&config).unwrap();
    assert_eq!(pipeline.settings().top_k, 2);

    let resp = pipeline.ask(QUESTION).unwrap();
    assert_eq!(resp.chunks.len(), 2);
    assert_eq!(resp.chunks[0], CHUNKS[1]);
    assert_eq!(resp.best_score, resp.scores[0]);
    assert!((resp.best_score - 1.0).abs() < 1e-4);
    assert_eq!(resp.answer, "عاصمة فرنسا هي باريس");
}

#[test]
fn unrelated_question_is_well_formed() {
    fake_mode();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::from_file(&write_flat_fixture(dir.path(), FAKE_DIM, 3, "flat")).unwrap();
    let resp = build_pipeline(&config).unwrap().ask("zzz qqq").unwrap();
    assert_eq!(resp.chunks.len(), 2);
    assert!(resp.best_score < 0.99, "no stored vector matches this question exactly");
    // No keyword overlap, so the order is pure similarity.
    assert!(resp.scores.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(resp.answer == REFUSAL_MESSAGE, resp.best_score < 0.72);
}

#[test]
fn embedding_dimension_mismatch_is_fatal() {
    fake_mode();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::from_file(&write_flat_fixture(dir.path(), 16, 3, "flat")).unwrap();
    let err = build_pipeline(&config).err().expect("dimension mismatch must fail");
    assert!(err.to_string().contains("dimension"), "{err}");
}

#[test]
fn row_count_must_match_corpus() {
    fake_mode();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::from_file(&write_flat_fixture(dir.path(), FAKE_DIM, 2, "flat")).unwrap();
    let err = build_pipeline(&config).err().expect("row mismatch must fail");
    assert!(err.to_string().contains("2 vectors"), "{err}");
}

#[test]
fn unknown_backend_is_rejected() {
    fake_mode();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::from_file(&write_flat_fixture(dir.path(), FAKE_DIM, 3, "faiss")).unwrap();
    let err = build_pipeline(&config).err().expect("unknown backend must fail");
    assert!(err.to_string().contains("faiss"), "{err}");
}

#[test]
fn missing_corpus_file_is_fatal() {
    fake_mode();
    let dir = tempfile::tempdir().unwrap();
    let path = write_flat_fixture(dir.path(), FAKE_DIM, 3, "flat");
    fs::remove_file(dir.path().join("chunks.json")).unwrap();
    let config = Config::from_file(&path).unwrap();
    assert!(build_pipeline(&config).is_err());
}
