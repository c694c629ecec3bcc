use dqa_core::domain::Chunk;
use dqa_core::error::AppError;
use serde::{Deserialize, Serialize};

mod flat;
mod similarity;

pub use flat::FlatIndex;

/// Metadata stored alongside each indexed chunk and echoed back per query
/// hit. Offsets are optional: entries indexed by a foreign writer may lack
/// them, and the evidence mapper tolerates that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub doc_id: String,
    pub filename: String,
    pub page_number: u32,
    pub char_start: Option<usize>,
    pub char_end: Option<usize>,
}

impl ChunkMetadata {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            doc_id: chunk.doc_id.clone(),
            filename: chunk.filename.clone(),
            page_number: chunk.page_number,
            char_start: Some(chunk.char_start),
            char_end: Some(chunk.char_end),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub vector: Vec<f32>,
}

/// Up to `n` nearest entries for one query vector. Distances are in
/// index-defined units where smaller means closer; the similarity
/// normalizer maps them onto [0, 1].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexQueryResult {
    pub texts: Vec<String>,
    pub metadatas: Vec<ChunkMetadata>,
    pub distances: Vec<f64>,
}

/// Index collaborator seam. The pipeline depends only on this interface;
/// implementations are swapped at configuration time.
pub trait VectorIndex {
    fn add(&mut self, entries: Vec<IndexEntry>) -> Result<(), AppError>;
    fn query(&self, vector: &[f32], n: usize) -> Result<IndexQueryResult, AppError>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
