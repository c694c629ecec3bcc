use std::fs;
use std::time::Duration;

use dqa_core::config::PipelineConfig;
use dqa_core::error::AppError;
use dqa_core::guard::{ensure_enough_memory, run_with_deadline};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn default_config_validates() {
    let cfg = PipelineConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.chunking.max_chunk_chars, 1000);
    assert_eq!(cfg.retrieval.similarity_threshold, 0.75);
    assert_eq!(cfg.retrieval.token_budget, 4000);
    assert_eq!(cfg.refusal_sentinel, "Answer not found in provided documents.");
}

#[test]
fn invalid_configs_are_rejected_with_config_invalid() {
    let mut cfg = PipelineConfig::default();
    cfg.retrieval.similarity_threshold = 1.5;
    assert_eq!(cfg.validate().unwrap_err().code, "CONFIG_INVALID");

    let mut cfg = PipelineConfig::default();
    cfg.chunking.max_chunk_chars = 0;
    assert_eq!(cfg.validate().unwrap_err().code, "CONFIG_INVALID");

    let mut cfg = PipelineConfig::default();
    cfg.chunking.min_chunk_chars = 5000;
    assert_eq!(cfg.validate().unwrap_err().code, "CONFIG_INVALID");

    let mut cfg = PipelineConfig::default();
    cfg.retrieval.diversity_margin = -0.1;
    assert_eq!(cfg.validate().unwrap_err().code, "CONFIG_INVALID");

    let mut cfg = PipelineConfig::default();
    cfg.refusal_sentinel = "   ".to_string();
    assert_eq!(cfg.validate().unwrap_err().code, "CONFIG_INVALID");
}

#[test]
fn config_loads_partial_overrides_from_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    fs::write(
        &path,
        r#"{
            "retrieval": { "similarity_threshold": 0.6, "token_budget": 2000 },
            "embedding_model": "all-minilm"
        }"#,
    )
    .unwrap();

    let cfg = PipelineConfig::load(&path).expect("load config");
    assert_eq!(cfg.retrieval.similarity_threshold, 0.6);
    assert_eq!(cfg.retrieval.token_budget, 2000);
    assert_eq!(cfg.embedding_model, "all-minilm");
    // Untouched sections keep their defaults.
    assert_eq!(cfg.retrieval.diversity_margin, 0.05);
    assert_eq!(cfg.chunking.max_chunk_chars, 1000);
}

#[test]
fn config_load_rejects_missing_and_invalid_files() {
    let dir = tempdir().unwrap();

    let missing = PipelineConfig::load(&dir.path().join("nope.json")).unwrap_err();
    assert_eq!(missing.code, "CONFIG_INVALID");

    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{ not json").unwrap();
    assert_eq!(PipelineConfig::load(&bad).unwrap_err().code, "CONFIG_INVALID");

    let out_of_range = dir.path().join("range.json");
    fs::write(
        &out_of_range,
        r#"{ "retrieval": { "similarity_threshold": 2.0 } }"#,
    )
    .unwrap();
    assert_eq!(
        PipelineConfig::load(&out_of_range).unwrap_err().code,
        "CONFIG_INVALID"
    );
}

#[test]
fn deadline_guard_passes_fast_operations_through() {
    let out = run_with_deadline("fast", Duration::from_secs(5), || Ok(41 + 1)).expect("fast op");
    assert_eq!(out, 42);
}

#[test]
fn deadline_guard_reports_overruns_as_resource_exhaustion() {
    let err = run_with_deadline("slow", Duration::from_millis(1), || {
        std::thread::sleep(Duration::from_millis(25));
        Ok(())
    })
    .unwrap_err();
    assert_eq!(err.code, "RESOURCE_EXHAUSTED");
}

#[test]
fn deadline_guard_propagates_inner_errors() {
    let err: AppError = run_with_deadline("failing", Duration::from_secs(5), || {
        Err::<(), _>(AppError::new("INDEX_FAILED", "boom"))
    })
    .unwrap_err();
    assert_eq!(err.code, "INDEX_FAILED");
}

#[test]
fn memory_guard_accepts_a_zero_floor() {
    // A zero floor can never trip; this exercises the sysinfo path.
    assert!(ensure_enough_memory(0.0).is_ok());
}
