use sha2::{Digest, Sha256};

use crate::config::{ChunkingConfig, GuardConfig};
use crate::domain::{Chunk, Page};
use crate::error::AppError;
use crate::guard;

/// Split page text into paragraph-packed segments bounded by `max_chars`.
///
/// Paragraphs (blank-line separated) are greedily packed into a running
/// buffer; a paragraph longer than `max_chars` is hard-split into
/// fixed-length slices at char boundaries, with the buffer flushed first so
/// emitted segments stay in page order. A final merge pass folds adjacent
/// under-sized segments back together where the join still fits.
fn split_into_segments(text: &str, max_chars: usize) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    let mut buf = String::new();

    for paragraph in text.split("\n\n") {
        let para = paragraph.trim();
        if para.is_empty() {
            continue;
        }
        if para.len() > max_chars {
            if !buf.is_empty() {
                segments.push(std::mem::take(&mut buf));
            }
            segments.extend(hard_split(para, max_chars));
            continue;
        }
        if buf.is_empty() {
            buf.push_str(para);
        } else if buf.len() + 2 + para.len() <= max_chars {
            buf.push_str("\n\n");
            buf.push_str(para);
        } else {
            segments.push(std::mem::take(&mut buf));
            buf.push_str(para);
        }
    }
    if !buf.is_empty() {
        segments.push(buf);
    }

    let mut merged: Vec<String> = Vec::new();
    for seg in segments {
        match merged.last_mut() {
            Some(last) if last.len() + 2 + seg.len() <= max_chars => {
                last.push_str("\n\n");
                last.push_str(&seg);
            }
            _ => merged.push(seg),
        }
    }
    merged
}

/// Fixed-length slicing for a single oversized paragraph. Lossy by design:
/// no semantic boundary search, only UTF-8 char boundaries are respected.
fn hard_split(para: &str, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut piece = String::new();
    for ch in para.chars() {
        if piece.len() + ch.len_utf8() > max_chars {
            out.push(std::mem::take(&mut piece));
        }
        piece.push(ch);
    }
    if !piece.is_empty() {
        out.push(piece);
    }
    out
}

fn chunk_id_for(doc_id: &str, page_number: u32, ordinal: u32, text: &str) -> String {
    let text_sha = hex::encode(Sha256::digest(text.as_bytes()));
    let id_input = format!("v1|{doc_id}|{page_number}|{ordinal}|{text_sha}");
    hex::encode(Sha256::digest(id_input.as_bytes()))
}

/// Chunk one page deterministically: same page and parameters always yield
/// the same chunk sequence and offsets.
///
/// Offsets are resolved by searching for each chunk's text in the page text
/// starting at the previous chunk's end, so duplicated passages map to
/// distinct positions. If the lookup fails (packing trimmed interior
/// whitespace), `char_start` defaults to the previous chunk's end.
pub fn chunk_page(page: &Page, cfg: &ChunkingConfig) -> Vec<Chunk> {
    let segments = split_into_segments(&page.text, cfg.max_chunk_chars);
    let mut chunks = Vec::with_capacity(segments.len());
    let mut cursor = 0usize;

    for (ordinal, seg) in segments.into_iter().enumerate() {
        let search_from = cursor.min(page.text.len());
        let haystack = page.text.get(search_from..).unwrap_or("");
        let char_start = match haystack.find(&seg) {
            Some(i) => search_from + i,
            None => cursor,
        };
        let char_end = char_start + seg.len();
        let chunk_id = chunk_id_for(&page.doc_id, page.page_number, ordinal as u32, &seg);
        chunks.push(Chunk {
            chunk_id,
            text: seg,
            doc_id: page.doc_id.clone(),
            filename: page.filename.clone(),
            page_number: page.page_number,
            char_start,
            char_end,
            regions: page.regions.clone(),
        });
        cursor = char_end;
    }
    chunks
}

/// Chunk a batch of pages after checking memory pressure. Pages are
/// independent; an empty or whitespace-only page contributes zero chunks.
pub fn build_chunks_from_pages(
    pages: &[Page],
    cfg: &ChunkingConfig,
    guard_cfg: &GuardConfig,
) -> Result<Vec<Chunk>, AppError> {
    guard::ensure_enough_memory(guard_cfg.min_free_memory_ratio)?;
    let mut out = Vec::new();
    for page in pages {
        out.extend(chunk_page(page, cfg));
    }
    Ok(out)
}
