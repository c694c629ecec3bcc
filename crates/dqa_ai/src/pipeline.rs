use std::time::Duration;

use dqa_core::chunk::chunk_page;
use dqa_core::config::PipelineConfig;
use dqa_core::domain::Page;
use dqa_core::error::AppError;
use dqa_core::guard;
use serde::{Deserialize, Serialize};

use crate::confidence::{score_confidence, ConfidenceInputs, ConfidenceResult};
use crate::context::assemble_context;
use crate::embeddings::Embedder;
use crate::evidence::{map_evidence, EvidenceSpan};
use crate::generate::{is_refusal, ExtractiveGenerator, Generator};
use crate::index::{ChunkMetadata, IndexEntry, VectorIndex};
use crate::retrieve::{retrieve_for_question, RetrievedSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDoc {
    pub doc_id: String,
    pub error: AppError,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub chunk_count: u32,
    pub indexed_docs: u32,
    pub skipped: Vec<SkippedDoc>,
}

/// Everything the presentation layer needs for one answered question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaOutcome {
    pub answer: String,
    pub refused: bool,
    pub confidence: ConfidenceResult,
    pub retrieved: RetrievedSet,
    pub evidence: Vec<EvidenceSpan>,
}

/// Explicitly owned pipeline context: created at session start, discarded
/// at reset. Owns the configuration and the collaborator seams; no ambient
/// global state.
pub struct QaPipeline {
    config: PipelineConfig,
    embedder: Box<dyn Embedder>,
    index: Box<dyn VectorIndex>,
    generator: Box<dyn Generator>,
    fallback: ExtractiveGenerator,
}

impl QaPipeline {
    pub fn new(
        config: PipelineConfig,
        embedder: Box<dyn Embedder>,
        index: Box<dyn VectorIndex>,
        generator: Box<dyn Generator>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let fallback = ExtractiveGenerator::new(config.refusal_sentinel.clone());
        Ok(Self {
            config,
            embedder,
            index,
            generator,
            fallback,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Chunk, embed, and index a batch of extracted pages. Documents are
    /// independent: a failure while embedding one document skips that
    /// document and continues with the rest.
    pub fn ingest_pages(&mut self, pages: &[Page]) -> Result<IngestReport, AppError> {
        guard::ensure_enough_memory(self.config.guard.min_free_memory_ratio)?;
        let ceiling = Duration::from_secs(self.config.guard.operation_timeout_secs);

        let mut docs: Vec<(String, Vec<&Page>)> = Vec::new();
        for page in pages {
            match docs.iter_mut().find(|(id, _)| id == &page.doc_id) {
                Some((_, doc_pages)) => doc_pages.push(page),
                None => docs.push((page.doc_id.clone(), vec![page])),
            }
        }

        let config = &self.config;
        let embedder = self.embedder.as_ref();
        let index = &mut self.index;
        guard::run_with_deadline("ingest_pages", ceiling, move || {
            let mut report = IngestReport::default();
            for (doc_id, doc_pages) in docs {
                match index_document(config, embedder, index.as_mut(), &doc_pages) {
                    Ok(count) => {
                        report.chunk_count += count;
                        report.indexed_docs += 1;
                    }
                    Err(error) => {
                        tracing::warn!(doc_id, code = %error.code, "skipping document");
                        report.skipped.push(SkippedDoc { doc_id, error });
                    }
                }
            }
            Ok(report)
        })
    }

    /// One sequential pass: retrieve -> assemble -> generate -> score ->
    /// map evidence. Degenerate retrievals short-circuit to the refusal
    /// outcome; a failing remote generator falls back to local extraction.
    pub fn answer(&self, question: &str) -> Result<QaOutcome, AppError> {
        guard::ensure_enough_memory(self.config.guard.min_free_memory_ratio)?;
        let ceiling = Duration::from_secs(self.config.guard.operation_timeout_secs);
        guard::run_with_deadline("answer", ceiling, || self.answer_inner(question))
    }

    fn answer_inner(&self, question: &str) -> Result<QaOutcome, AppError> {
        let retrieved = retrieve_for_question(
            self.index.as_ref(),
            self.embedder.as_ref(),
            &self.config.embedding_model,
            question,
            &self.config.retrieval,
        )?;
        let context = assemble_context(&retrieved, self.config.retrieval.token_budget);

        if context.is_empty() {
            return Ok(self.refusal_outcome(retrieved, question));
        }

        let response = match self.generator.generate(&context, question) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(code = %e.code, "generator unavailable; using extractive fallback");
                self.fallback.generate(&context, question)?
            }
        };

        let refused = is_refusal(&response.answer, &self.config.refusal_sentinel);
        let evidence_found = !refused && !retrieved.is_empty();
        let similarities = retrieved.similarities();
        let confidence = score_confidence(
            &ConfidenceInputs {
                similarities: &similarities,
                evidence_found,
                context_length: context.len(),
                answer_length: response.answer.len(),
                generator_confidence: response.confidence_label,
            },
            &self.config.scoring,
        );
        let evidence = map_evidence(&retrieved, question);

        Ok(QaOutcome {
            answer: response.answer,
            refused,
            confidence,
            retrieved,
            evidence,
        })
    }

    fn refusal_outcome(&self, retrieved: RetrievedSet, question: &str) -> QaOutcome {
        let similarities = retrieved.similarities();
        let confidence = score_confidence(
            &ConfidenceInputs {
                similarities: &similarities,
                evidence_found: false,
                context_length: 0,
                answer_length: 0,
                generator_confidence: None,
            },
            &self.config.scoring,
        );
        let evidence = map_evidence(&retrieved, question);
        QaOutcome {
            answer: self.config.refusal_sentinel.clone(),
            refused: true,
            confidence,
            retrieved,
            evidence,
        }
    }
}

fn index_document(
    config: &PipelineConfig,
    embedder: &dyn Embedder,
    index: &mut dyn VectorIndex,
    pages: &[&Page],
) -> Result<u32, AppError> {
    let mut entries = Vec::new();
    for page in pages {
        for chunk in chunk_page(page, &config.chunking) {
            let vector = embedder.embed(&config.embedding_model, &chunk.text)?;
            entries.push(IndexEntry {
                id: chunk.chunk_id.clone(),
                metadata: ChunkMetadata::from_chunk(&chunk),
                text: chunk.text,
                vector,
            });
        }
    }
    let count = entries.len() as u32;
    // All-or-nothing per document so a failed embed never leaves a
    // half-indexed document behind.
    index.add(entries)?;
    Ok(count)
}
