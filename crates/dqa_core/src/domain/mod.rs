use serde::{Deserialize, Serialize};

/// Bounding box of a detected non-text region on a page, supplied by the
/// extraction collaborator. The pipeline never interprets the coordinates;
/// it only carries them from page to chunk unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// One page of extracted document text. Immutable once created; owned by
/// the ingestion pass until chunked, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub doc_id: String,
    pub filename: String,
    pub page_number: u32,
    pub text: String,
    #[serde(default)]
    pub regions: Vec<Region>,
}

/// Bounded, offset-tracked segment of one page. The unit of embedding,
/// indexing, retrieval, and citation; never mutated after creation.
///
/// `char_start`/`char_end` are byte offsets into the originating page text.
/// When the offset lookup resolved, `char_end - char_start == text.len()`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub chunk_id: String,
    pub text: String,
    pub doc_id: String,
    pub filename: String,
    pub page_number: u32,
    pub char_start: usize,
    pub char_end: usize,
    #[serde(default)]
    pub regions: Vec<Region>,
}
