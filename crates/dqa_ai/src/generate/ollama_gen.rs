use dqa_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::prompts::grounded_answer_prompt;
use super::{Generator, GeneratorResponse};
use crate::confidence::ConfidenceLevel;
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
    refusal_sentinel: String,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient, model: impl Into<String>, refusal_sentinel: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            refusal_sentinel: refusal_sentinel.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

fn parse_confidence_line(line: &str) -> Option<ConfidenceLevel> {
    match line.strip_prefix("Confidence:")?.trim() {
        "High" => Some(ConfidenceLevel::High),
        "Medium" => Some(ConfidenceLevel::Medium),
        "Low" => Some(ConfidenceLevel::Low),
        _ => None,
    }
}

/// Strip a trailing `Confidence: <level>` line when present. Anything else
/// in the output stays opaque text.
fn split_confidence(raw: &str) -> (String, Option<ConfidenceLevel>) {
    let trimmed = raw.trim();
    if let Some(idx) = trimmed.rfind('\n') {
        let (body, last) = trimmed.split_at(idx);
        if let Some(level) = parse_confidence_line(last.trim_start()) {
            return (body.trim_end().to_string(), Some(level));
        }
    }
    (trimmed.to_string(), None)
}

impl Generator for OllamaGenerator {
    fn generate(&self, context: &str, question: &str) -> Result<GeneratorResponse, AppError> {
        let prompt = grounded_answer_prompt(context, question, &self.refusal_sentinel);
        let url = format!("{}/api/generate", self.client.base_url());
        let req = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
        };

        let resp = ureq::post(&url)
            .timeout(std::time::Duration::from_secs(30))
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("GENERATOR_UNAVAILABLE", "Failed to encode generate request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: GenerateResponse = r.into_json().map_err(|e| {
                    AppError::new("GENERATOR_UNAVAILABLE", "Failed to decode generate response")
                        .with_details(e.to_string())
                })?;
                if v.response.trim().is_empty() {
                    return Err(AppError::new(
                        "GENERATOR_UNAVAILABLE",
                        "Generate response was empty",
                    ));
                }
                let (answer, confidence_label) = split_confidence(&v.response);
                Ok(GeneratorResponse {
                    answer,
                    confidence_label,
                })
            }
            Ok(r) => Err(
                AppError::new("GENERATOR_UNAVAILABLE", "Generate request failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(
                AppError::new("GENERATOR_UNAVAILABLE", "Failed to call generate endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}
