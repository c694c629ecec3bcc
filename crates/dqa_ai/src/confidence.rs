use std::collections::BTreeMap;
use std::fmt;

use dqa_core::config::ScoringConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    fn generator_component(self) -> f64 {
        match self {
            ConfidenceLevel::Low => 0.3,
            ConfidenceLevel::Medium => 0.6,
            ConfidenceLevel::High => 0.9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ConfidenceInputs<'a> {
    pub similarities: &'a [f64],
    pub evidence_found: bool,
    pub context_length: usize,
    pub answer_length: usize,
    pub generator_confidence: Option<ConfidenceLevel>,
}

/// Derived fresh per answer; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub score: f64,
    pub level: ConfidenceLevel,
    pub components: BTreeMap<String, f64>,
    pub explanation: String,
}

/// Combine retrieval-quality signals with the generator's self-reported
/// label into one score and discrete level.
///
/// retrieval = 0.4*similarity + 0.3*evidence + 0.2*coverage + 0.1*specificity
/// final     = 0.7*retrieval + 0.3*generator, clamped to [0, 1]
///
/// Guardrail: when no evidence was found the level is capped below High no
/// matter what the arithmetic says, and the explanation states why.
pub fn score_confidence(inputs: &ConfidenceInputs, cfg: &ScoringConfig) -> ConfidenceResult {
    let similarity = inputs
        .similarities
        .iter()
        .copied()
        .fold(0.0f64, f64::max);
    let evidence = if inputs.evidence_found { 1.0 } else { 0.0 };
    let coverage = (inputs.context_length as f64 / cfg.coverage_norm as f64).min(1.0);
    let specificity = (inputs.answer_length as f64 / cfg.specificity_norm as f64).min(1.0);
    let generator = inputs
        .generator_confidence
        .map(ConfidenceLevel::generator_component)
        .unwrap_or(0.5);

    let retrieval_score =
        0.4 * similarity + 0.3 * evidence + 0.2 * coverage + 0.1 * specificity;
    let score = (0.7 * retrieval_score + 0.3 * generator).clamp(0.0, 1.0);

    let mut level = if score >= 0.7 {
        ConfidenceLevel::High
    } else if score >= 0.4 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };
    if !inputs.evidence_found && level == ConfidenceLevel::High {
        level = ConfidenceLevel::Medium;
    }

    let mut components = BTreeMap::new();
    components.insert("similarity".to_string(), similarity);
    components.insert("evidence".to_string(), evidence);
    components.insert("coverage".to_string(), coverage);
    components.insert("specificity".to_string(), specificity);
    components.insert("generator".to_string(), generator);

    let explanation = explain(level, similarity, inputs.evidence_found);

    ConfidenceResult {
        score,
        level,
        components,
        explanation,
    }
}

fn explain(level: ConfidenceLevel, similarity: f64, evidence_found: bool) -> String {
    if !evidence_found {
        return format!(
            "{level} confidence: no direct evidence found in the documents; confidence is capped below High."
        );
    }
    match level {
        ConfidenceLevel::High => format!(
            "High confidence: strong semantic match (similarity: {similarity:.2}) with direct evidence."
        ),
        ConfidenceLevel::Medium => {
            "Medium confidence: relevant information found but may need verification.".to_string()
        }
        ConfidenceLevel::Low => {
            "Low confidence: limited evidence found; answer based on partial information."
                .to_string()
        }
    }
}
