use dqa_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceLevel;

mod extractive;
mod ollama_gen;
mod prompts;

pub use extractive::ExtractiveGenerator;
pub use ollama_gen::OllamaGenerator;
pub use prompts::grounded_answer_prompt;

/// Typed result contract at the generator boundary. The answer is opaque
/// text; the refusal sentinel inside it is the only structured "no answer"
/// signal, plus an optional self-reported confidence label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorResponse {
    pub answer: String,
    pub confidence_label: Option<ConfidenceLevel>,
}

/// Generation collaborator seam. Implementations must be instructed to
/// return the configured refusal sentinel, exactly, when no grounded answer
/// is possible.
pub trait Generator {
    fn generate(&self, context: &str, question: &str) -> Result<GeneratorResponse, AppError>;
}

/// Pattern-match the refusal sentinel to distinguish "no answer" from
/// "has answer" without a separate boolean.
pub fn is_refusal(answer: &str, sentinel: &str) -> bool {
    answer.contains(sentinel)
}
