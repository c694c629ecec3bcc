use dqa_core::error::AppError;

use super::{Generator, GeneratorResponse};
use crate::confidence::ConfidenceLevel;
use crate::evidence::extract_keywords;

/// Best-effort local answer extraction: picks the context sentence with the
/// highest question-keyword overlap. Used directly in offline deployments
/// and as the fallback when the remote generator is unavailable, so the
/// pipeline degrades to partial transparency instead of a hard failure.
#[derive(Debug, Clone)]
pub struct ExtractiveGenerator {
    refusal_sentinel: String,
}

impl ExtractiveGenerator {
    pub fn new(refusal_sentinel: impl Into<String>) -> Self {
        Self {
            refusal_sentinel: refusal_sentinel.into(),
        }
    }
}

impl Generator for ExtractiveGenerator {
    fn generate(&self, context: &str, question: &str) -> Result<GeneratorResponse, AppError> {
        let keywords = extract_keywords(question);

        let mut best: Option<(usize, &str)> = None;
        for sentence in context.split(['.', '!', '?']) {
            let sentence = sentence.trim();
            if sentence.len() < 10 || sentence.contains("[Source:") {
                continue;
            }
            let lowered = sentence.to_lowercase();
            let score = keywords.iter().filter(|kw| lowered.contains(kw.as_str())).count();
            if score > 0 && best.map_or(true, |(s, _)| score > s) {
                best = Some((score, sentence));
            }
        }

        match best {
            Some((_, sentence)) => Ok(GeneratorResponse {
                answer: format!("{sentence}."),
                confidence_label: Some(ConfidenceLevel::Medium),
            }),
            None => Ok(GeneratorResponse {
                answer: self.refusal_sentinel.clone(),
                confidence_label: Some(ConfidenceLevel::Low),
            }),
        }
    }
}
