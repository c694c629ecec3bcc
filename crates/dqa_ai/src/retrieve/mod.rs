use std::collections::BTreeSet;

use dqa_core::config::RetrievalConfig;
use dqa_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::context::estimate_tokens;
use crate::embeddings::Embedder;
use crate::index::{ChunkMetadata, VectorIndex};
use crate::normalize::normalize_distances;

/// A chunk returned by the index for one query, after normalization.
/// Exists only for the duration of that query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub similarity: f64,
}

/// Ordered selection for one question. Total estimated token cost never
/// exceeds the configured budget, and no two entries share
/// `(doc_id, page_number)` unless the second cleared the diversity margin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievedSet {
    pub candidates: Vec<ScoredCandidate>,
    pub total_token_estimate: usize,
}

impl RetrievedSet {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn similarities(&self) -> Vec<f64> {
        self.candidates.iter().map(|c| c.similarity).collect()
    }
}

/// Select a subset of candidates under similarity, diversity, and
/// token-budget constraints.
///
/// Gates, applied in order over candidates sorted by descending similarity:
/// 1. quality: drop candidates below `similarity_threshold`;
/// 2. diversity: drop candidates from an already-covered
///    `(doc_id, page_number)` unless their similarity clears
///    `threshold + diversity_margin`;
/// 3. budget: once the running token estimate would exceed `token_budget`,
///    retrieval ends for the whole query (a hard stop, not a per-candidate
///    skip), preserving rank order of included evidence.
///
/// If nothing was accepted, the fallback takes the top `fallback_top_n`
/// candidates regardless of threshold, still budget-capped, so a non-empty
/// candidate list always yields a non-empty result.
pub fn dynamic_retrieve(
    mut candidates: Vec<ScoredCandidate>,
    cfg: &RetrievalConfig,
) -> RetrievedSet {
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut selected: Vec<ScoredCandidate> = Vec::new();
    let mut covered: BTreeSet<(String, u32)> = BTreeSet::new();
    let mut total_tokens = 0usize;

    for cand in &candidates {
        if cand.similarity < cfg.similarity_threshold {
            continue;
        }
        let key = (cand.metadata.doc_id.clone(), cand.metadata.page_number);
        if covered.contains(&key)
            && cand.similarity < cfg.similarity_threshold + cfg.diversity_margin
        {
            continue;
        }
        let est = estimate_tokens(&cand.text);
        if total_tokens + est > cfg.token_budget {
            tracing::info!(total_tokens, "stopping retrieval at token budget");
            break;
        }
        selected.push(cand.clone());
        total_tokens += est;
        covered.insert(key);
    }

    if selected.is_empty() && !candidates.is_empty() {
        tracing::info!(
            fallback_top_n = cfg.fallback_top_n,
            "no candidate passed the similarity threshold; falling back to best available"
        );
        total_tokens = 0;
        for cand in candidates.iter().take(cfg.fallback_top_n) {
            let est = estimate_tokens(&cand.text);
            if total_tokens + est > cfg.token_budget {
                break;
            }
            selected.push(cand.clone());
            total_tokens += est;
        }
    }

    RetrievedSet {
        candidates: selected,
        total_token_estimate: total_tokens,
    }
}

/// Full query-side pass: embed the question, over-query the index, convert
/// raw distances to similarities, then select dynamically. An index with no
/// hits yields an empty set, not an error.
pub fn retrieve_for_question(
    index: &dyn VectorIndex,
    embedder: &dyn Embedder,
    model: &str,
    question: &str,
    cfg: &RetrievalConfig,
) -> Result<RetrievedSet, AppError> {
    let q = question.trim();
    if q.is_empty() {
        return Err(AppError::new("QUERY_INVALID", "Question must not be empty"));
    }
    if index.is_empty() {
        return Ok(RetrievedSet::default());
    }

    let qv = embedder.embed(model, q)?;
    let raw = index.query(&qv, cfg.over_query_n)?;
    if raw.texts.is_empty() {
        return Ok(RetrievedSet::default());
    }

    let sims = normalize_distances(&raw.distances);
    let candidates = raw
        .texts
        .into_iter()
        .zip(raw.metadatas)
        .zip(sims)
        .map(|((text, metadata), similarity)| ScoredCandidate {
            text,
            metadata,
            similarity,
        })
        .collect();

    Ok(dynamic_retrieve(candidates, cfg))
}
