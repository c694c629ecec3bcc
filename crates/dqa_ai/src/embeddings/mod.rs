use dqa_core::error::AppError;

/// Embedding collaborator: opaque fixed-length vectors for chunks at ingest
/// time and for the question at query time. The pipeline assumes consistent
/// dimensionality but is agnostic to its value.
pub trait Embedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;
}

pub mod ollama_embed;
