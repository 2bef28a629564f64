use std::fs;
use tempfile::TempDir;

use smartabic_core::config::{resolve_with_base, Config};
use smartabic_core::corpus::Corpus;
use smartabic_core::error::Error;
use smartabic_core::settings::{QaSettings, REFUSAL_MESSAGE};
use smartabic_core::traits::ChunkStore;

#[test]
fn corpus_from_json_addresses_chunks_by_position() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("chunks.json");
    fs::write(&path, r#"["عاصمة فرنسا هي باريس.", "second chunk", "third"]"#).unwrap();

    let corpus = Corpus::load_json(&path).expect("load corpus");
    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus.chunk_at(0).unwrap(), "عاصمة فرنسا هي باريس.");
    assert_eq!(corpus.chunk_at(2).unwrap(), "third");
}

#[test]
fn chunk_lookup_past_the_end_is_an_error() {
    let corpus = Corpus::from_chunks(vec!["only".to_string()]).unwrap();
    match corpus.chunk_at(1) {
        Err(Error::ChunkOutOfRange { id, len }) => {
            assert_eq!(id, 1);
            assert_eq!(len, 1);
        }
        other => panic!("expected ChunkOutOfRange, got {other:?}"),
    }
}

#[test]
fn empty_corpus_is_rejected() {
    assert!(matches!(Corpus::from_chunks(vec![]), Err(Error::EmptyCorpus)));

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.json");
    fs::write(&path, "[]").unwrap();
    assert!(Corpus::load_json(&path).is_err());
}

#[test]
fn malformed_corpus_file_fails_to_load() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(&path, "{not json").unwrap();
    assert!(Corpus::load_json(&path).is_err());
    assert!(Corpus::load_json(&tmp.path().join("missing.json")).is_err());
}

#[test]
fn qa_settings_default_to_shipped_constants() {
    let s = QaSettings::default();
    assert_eq!(s.query_prefix, "query: ");
    assert_eq!(s.top_k, 5);
    assert_eq!(s.search_k, 80);
    assert!((s.dont_know_threshold - 0.72).abs() < f32::EPSILON);
    assert_eq!(s.refusal_message, REFUSAL_MESSAGE);
    assert_eq!(s.sentence_delimiters, vec!['۔', '.', '!', '؟', '\n']);
    assert_eq!(s.min_answer_chars, 18);
    assert_eq!(s.fallback_chars, 220);
    assert!(s.stop_words.iter().any(|w| w == "ماهي"));
    s.validate().expect("defaults are valid");
}

#[test]
fn config_file_overrides_part_of_qa_section() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(
        &path,
        r#"
[data]
backend = "flat"
corpus_path = "data/chunks.json"

[qa]
top_k = 3
dont_know_threshold = 0.5
sentence_delimiters = [".", "\n"]
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).expect("config");
    let qa = config.qa_settings().expect("qa settings");
    assert_eq!(qa.top_k, 3);
    assert_eq!(qa.search_k, 80, "unspecified keys keep their defaults");
    assert!((qa.dont_know_threshold - 0.5).abs() < f32::EPSILON);
    assert_eq!(qa.sentence_delimiters, vec!['.', '\n']);

    let backend: String = config.get("data.backend").unwrap();
    assert_eq!(backend, "flat");
    assert_eq!(config.path("data.corpus_path").unwrap(), tmp.path().join("data/chunks.json"));
}

#[test]
fn missing_qa_section_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[data]\nbackend = \"lance\"\n").unwrap();
    let config = Config::from_file(&path).expect("config");
    assert_eq!(config.qa_settings().unwrap(), QaSettings::default());
}

#[test]
fn invalid_qa_values_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[qa]\ntop_k = 0\n").unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn absolute_paths_are_not_rebased() {
    let base = std::path::Path::new("/srv/smartabic");
    assert_eq!(resolve_with_base(base, "/data/chunks.json"), std::path::PathBuf::from("/data/chunks.json"));
    assert_eq!(resolve_with_base(base, "chunks.json"), base.join("chunks.json"));
}

/// Env-driven loading lives in one test: `RUST_ENV` and `APP_*` are process-wide.
#[test]
fn load_from_dir_layers_env_overlay_and_app_vars() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[qa]\ntop_k = 3\nsearch_k = 10\ndont_know_threshold = 0.9\n").unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[qa]\nsearch_k = 40\ndont_know_threshold = 0.8\n").unwrap();

    std::env::set_var("RUST_ENV", "test");
    std::env::set_var("APP_QA__DONT_KNOW_THRESHOLD", "0.6");
    let layered = Config::load_from_dir(tmp.path()).and_then(|c| c.qa_settings());
    std::env::remove_var("APP_QA__DONT_KNOW_THRESHOLD");

    let qa = layered.expect("layered config");
    assert_eq!(qa.top_k, 3, "base file");
    assert_eq!(qa.search_k, 40, "env overlay beats base file");
    assert!((qa.dont_know_threshold - 0.6).abs() < f32::EPSILON, "APP_ var beats both files");

    std::env::set_var("RUST_ENV", "prod");
    let prod_without_backend = Config::load_from_dir(tmp.path());
    fs::write(tmp.path().join("config.prod.toml"), "[data]\nbackend = \"flat\"\n").unwrap();
    let prod_with_backend = Config::load_from_dir(tmp.path());
    std::env::remove_var("RUST_ENV");

    let err = prod_without_backend.err().expect("prod requires data.backend");
    assert!(err.to_string().contains("data.backend"), "{err}");
    assert!(prod_with_backend.is_ok());
}
