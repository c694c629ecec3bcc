use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape used across the pipeline crates.
///
/// Codes are stable strings the presentation layer can match on:
/// `CONFIG_INVALID`, `RESOURCE_EXHAUSTED`, `EXTRACTION_FAILED`,
/// `EMBEDDINGS_FAILED`, `INDEX_FAILED`, `GENERATOR_UNAVAILABLE`,
/// `QUERY_INVALID`. Degenerate-but-well-typed inputs (empty pages, empty
/// candidate lists) are represented by empty results, never by an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
