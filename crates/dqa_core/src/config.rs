use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Chunker tunables. `min_chunk_chars` is a soft target only: a trailing
/// chunk of a page may fall below it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chunk_chars: usize,
    pub min_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 1000,
            min_chunk_chars: 200,
        }
    }
}

/// Dynamic retriever tunables. The diversity margin and fallback cap are
/// heuristics with no derivation behind the defaults; they are configuration
/// precisely so deployments can recalibrate them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub similarity_threshold: f64,
    pub token_budget: usize,
    pub diversity_margin: f64,
    pub fallback_top_n: usize,
    pub over_query_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            token_budget: 4000,
            diversity_margin: 0.05,
            fallback_top_n: 8,
            over_query_n: 50,
        }
    }
}

/// Reference lengths the confidence scorer normalizes against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub coverage_norm: usize,
    pub specificity_norm: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            coverage_norm: 1000,
            specificity_norm: 50,
        }
    }
}

/// Resource guard ceilings. The timeout is cooperative: in-flight work is
/// never preempted, only reported after the fact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    pub min_free_memory_ratio: f64,
    pub operation_timeout_secs: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_free_memory_ratio: 0.05,
            operation_timeout_secs: 120,
        }
    }
}

/// Every tunable of the retrieval-and-grounding pipeline in one
/// serde-deserializable object. Callers construct it once per session and
/// pass it down; there is no ambient global configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub scoring: ScoringConfig,
    pub guard: GuardConfig,
    pub embedding_model: String,
    pub refusal_sentinel: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            scoring: ScoringConfig::default(),
            guard: GuardConfig::default(),
            embedding_model: "nomic-embed-text".to_string(),
            refusal_sentinel: "Answer not found in provided documents.".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::new("CONFIG_INVALID", "Failed to read pipeline config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        let cfg: Self = serde_json::from_str(&raw).map_err(|e| {
            AppError::new("CONFIG_INVALID", "Failed to decode pipeline config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.chunking.max_chunk_chars == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "max_chunk_chars must be greater than zero",
            ));
        }
        if self.chunking.min_chunk_chars > self.chunking.max_chunk_chars {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "min_chunk_chars must not exceed max_chunk_chars",
            )
            .with_details(format!(
                "min={}; max={}",
                self.chunking.min_chunk_chars, self.chunking.max_chunk_chars
            )));
        }
        if !(0.0..=1.0).contains(&self.retrieval.similarity_threshold) {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "similarity_threshold must lie in [0, 1]",
            )
            .with_details(format!("threshold={}", self.retrieval.similarity_threshold)));
        }
        if self.retrieval.diversity_margin < 0.0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "diversity_margin must not be negative",
            ));
        }
        if self.retrieval.token_budget == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "token_budget must be greater than zero",
            ));
        }
        if self.retrieval.fallback_top_n == 0 || self.retrieval.over_query_n == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "fallback_top_n and over_query_n must be greater than zero",
            ));
        }
        if self.scoring.coverage_norm == 0 || self.scoring.specificity_norm == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "scoring norms must be greater than zero",
            ));
        }
        if !(0.0..1.0).contains(&self.guard.min_free_memory_ratio) {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "min_free_memory_ratio must lie in [0, 1)",
            ));
        }
        if self.refusal_sentinel.trim().is_empty() {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "refusal_sentinel must not be empty",
            ));
        }
        Ok(())
    }
}
