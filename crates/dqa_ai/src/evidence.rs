use serde::{Deserialize, Serialize};

use crate::retrieve::RetrievedSet;

/// Highlight span at absolute byte offsets within the originating page
/// text. Overlapping or conflicting spans are possible by design; renderers
/// must tolerate them, this component never merges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub keyword: String,
}

/// Display-ready evidence for one retrieved chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceSpan {
    pub filename: String,
    pub page_number: u32,
    pub char_start: Option<usize>,
    pub char_end: Option<usize>,
    pub text: String,
    pub highlights: Vec<Highlight>,
}

/// Keyword tokens from a question: lowercased, stripped of surrounding
/// punctuation, longer than 3 characters. A minimal heuristic, not
/// linguistic stemming.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| w.len() > 3)
        .collect()
}

/// Locate question keywords within each retrieved chunk and map them back
/// to absolute character positions.
///
/// First-occurrence, independent per-keyword search. A chunk without a
/// resolvable `char_start` is still returned, just with no highlights.
pub fn map_evidence(retrieved: &RetrievedSet, question: &str) -> Vec<EvidenceSpan> {
    let keywords = extract_keywords(question);
    let mut out = Vec::with_capacity(retrieved.candidates.len());

    for cand in &retrieved.candidates {
        let mut highlights = Vec::new();
        if let Some(base) = cand.metadata.char_start {
            if !keywords.is_empty() {
                let lowered = cand.text.to_lowercase();
                // Lowercasing can change byte lengths outside ASCII; only
                // search the lowered text when offsets stay aligned.
                let haystack: &str = if lowered.len() == cand.text.len() {
                    &lowered
                } else {
                    &cand.text
                };
                for kw in &keywords {
                    if let Some(idx) = haystack.find(kw.as_str()) {
                        highlights.push(Highlight {
                            start: base + idx,
                            end: base + idx + kw.len(),
                            keyword: kw.clone(),
                        });
                    }
                }
            }
        }
        out.push(EvidenceSpan {
            filename: cand.metadata.filename.clone(),
            page_number: cand.metadata.page_number,
            char_start: cand.metadata.char_start,
            char_end: cand.metadata.char_end,
            text: cand.text.clone(),
            highlights,
        });
    }
    out
}
