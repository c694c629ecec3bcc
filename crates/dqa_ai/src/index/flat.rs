use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use dqa_core::error::AppError;

use super::similarity::{cosine_similarity, l2_norm};
use super::{IndexEntry, IndexQueryResult, VectorIndex};

/// Brute-force cosine index over all stored vectors, optionally persisted
/// as JSON (written atomically via tmp -> rename). Distance is
/// `1 - cosine_similarity`, so smaller means closer.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    entries: BTreeMap<String, IndexEntry>,
    dims: Option<usize>,
    path: Option<PathBuf>,
}

impl FlatIndex {
    pub fn in_memory() -> Self {
        Self {
            entries: BTreeMap::new(),
            dims: None,
            path: None,
        }
    }

    /// Open a file-backed index, loading existing entries when present.
    pub fn open(path: PathBuf) -> Result<Self, AppError> {
        let mut index = Self {
            entries: BTreeMap::new(),
            dims: None,
            path: Some(path.clone()),
        };
        if path.exists() {
            let bytes = fs::read(&path).map_err(|e| {
                AppError::new("INDEX_FAILED", "Failed to read index file")
                    .with_details(format!("path={}; err={}", path.display(), e))
            })?;
            let entries: BTreeMap<String, IndexEntry> =
                serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::new("INDEX_FAILED", "Failed to decode index file")
                        .with_details(format!("path={}; err={}", path.display(), e))
                })?;
            index.dims = entries.values().next().map(|e| e.vector.len());
            index.entries = entries;
        }
        Ok(index)
    }

    fn persist(&self) -> Result<(), AppError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::new("INDEX_FAILED", "Failed to create index directory")
                    .with_details(format!("path={}; err={}", parent.display(), e))
            })?;
        }
        let tmp = path.with_extension("tmp");
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            AppError::new("INDEX_FAILED", "Failed to encode index entries")
                .with_details(e.to_string())
        })?;
        fs::write(&tmp, json.as_bytes()).map_err(|e| {
            AppError::new("INDEX_FAILED", "Failed to write index file")
                .with_details(format!("path={}; err={}", tmp.display(), e))
        })?;
        fs::rename(&tmp, path).map_err(|e| {
            AppError::new("INDEX_FAILED", "Failed to finalize index write").with_details(format!(
                "tmp={}; dest={}; err={}",
                tmp.display(),
                path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, entries: Vec<IndexEntry>) -> Result<(), AppError> {
        for entry in entries {
            let this_dims = entry.vector.len();
            if this_dims == 0 {
                return Err(AppError::new("INDEX_FAILED", "Entry vector is empty")
                    .with_details(format!("id={}", entry.id)));
            }
            match self.dims {
                Some(d) if d != this_dims => {
                    return Err(AppError::new(
                        "INDEX_FAILED",
                        "Embedding dimension mismatch across entries",
                    )
                    .with_details(format!(
                        "expected={}; got={}; id={}",
                        d, this_dims, entry.id
                    )));
                }
                Some(_) => {}
                None => self.dims = Some(this_dims),
            }
            self.entries.insert(entry.id.clone(), entry);
        }
        self.persist()
    }

    fn query(&self, vector: &[f32], n: usize) -> Result<IndexQueryResult, AppError> {
        if self.entries.is_empty() || n == 0 {
            return Ok(IndexQueryResult::default());
        }
        if let Some(d) = self.dims {
            if vector.len() != d {
                return Err(AppError::new(
                    "QUERY_INVALID",
                    "Query vector dims do not match index dims",
                )
                .with_details(format!("index_dims={d}; query_dims={}", vector.len())));
            }
        }
        let qnorm = l2_norm(vector);
        if qnorm == 0.0 {
            return Err(AppError::new("QUERY_INVALID", "Query vector norm is zero"));
        }

        let mut hits: Vec<(f64, &IndexEntry)> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.values() {
            let vnorm = l2_norm(&entry.vector);
            if vnorm == 0.0 {
                continue;
            }
            let sim = cosine_similarity(vector, &entry.vector, qnorm, vnorm);
            hits.push((1.0 - sim as f64, entry));
        }

        // Closest first; ties break on id so results are deterministic.
        hits.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        hits.truncate(n);

        let mut out = IndexQueryResult::default();
        for (distance, entry) in hits {
            out.texts.push(entry.text.clone());
            out.metadatas.push(entry.metadata.clone());
            out.distances.push(distance);
        }
        Ok(out)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
