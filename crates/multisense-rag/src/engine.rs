// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RAG engine: document ingestion and query-time retrieval.

use std::collections::HashMap;
use std::sync::Arc;

use multisense_config::model::RagConfig;
use multisense_core::error::MultisenseError;
use multisense_core::traits::{EmbeddingGateway, VectorIndex};
use multisense_core::types::{
    DocumentChunk, EmbeddingInput, IngestionReport, RetrievalResult,
};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::chunker::split_text;

/// Deterministic chunk id: a short hash of the document id plus the
/// zero-padded sequence index.
///
/// Re-ingesting a document with the same splitting parameters regenerates the
/// same ids, so the index upsert overwrites prior chunks instead of
/// duplicating them.
pub fn chunk_id(document_id: &str, sequence_index: u32) -> String {
    let digest = Sha256::digest(document_id.as_bytes());
    format!("{}-{sequence_index:05}", hex::encode(&digest[..6]))
}

/// Retrieval-augmented generation engine.
///
/// Owns no state of its own; documents live in the vector index and
/// embeddings come from the embedding gateway.
pub struct RagEngine {
    embedder: Arc<dyn EmbeddingGateway>,
    index: Arc<dyn VectorIndex>,
    config: RagConfig,
}

impl RagEngine {
    /// Creates a new engine over the given collaborators.
    pub fn new(
        embedder: Arc<dyn EmbeddingGateway>,
        index: Arc<dyn VectorIndex>,
        config: RagConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    /// The engine's retrieval configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Splits, embeds, and stores a document.
    ///
    /// Each chunk is embedded and upserted individually; a failure on one
    /// chunk does not stop the rest. If any chunk fails, the whole call
    /// reports [`MultisenseError::PartialIngestion`] with the failed sequence
    /// indices -- chunks already stored remain queryable, and retrying the
    /// same document is safe because chunk ids are deterministic.
    ///
    /// An empty (or whitespace-only) document yields a zero-chunk report.
    pub async fn ingest(
        &self,
        document_id: &str,
        full_text: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<IngestionReport, MultisenseError> {
        let chunks = split_text(full_text, self.config.chunk_size, self.config.chunk_overlap);
        debug!(
            document_id,
            chunk_count = chunks.len(),
            chunk_size = self.config.chunk_size,
            chunk_overlap = self.config.chunk_overlap,
            "document chunked"
        );

        if chunks.is_empty() {
            return Ok(IngestionReport {
                document_id: document_id.to_string(),
                chunks_created: 0,
                chunk_ids: Vec::new(),
            });
        }

        let total_chunks = chunks.len();
        let mut chunk_ids = Vec::with_capacity(total_chunks);
        let mut failed_chunks = Vec::new();

        for (i, text) in chunks.into_iter().enumerate() {
            let embedding = match self
                .embedder
                .embed(EmbeddingInput { texts: vec![text.clone()] })
                .await
            {
                Ok(output) => match output.embeddings.into_iter().next() {
                    Some(embedding) => embedding,
                    None => {
                        warn!(document_id, chunk = i, "embedding gateway returned no vector");
                        failed_chunks.push(i);
                        continue;
                    }
                },
                Err(e) => {
                    warn!(document_id, chunk = i, error = %e, "chunk embedding failed");
                    failed_chunks.push(i);
                    continue;
                }
            };

            let id = chunk_id(document_id, i as u32);
            let mut chunk_metadata = metadata.clone();
            chunk_metadata.insert("total_chunks".to_string(), total_chunks.to_string());

            let chunk = DocumentChunk {
                chunk_id: id.clone(),
                document_id: document_id.to_string(),
                sequence_index: i as u32,
                text,
                embedding,
                metadata: chunk_metadata,
            };

            if let Err(e) = self.index.upsert(&chunk).await {
                warn!(document_id, chunk = i, error = %e, "chunk store upsert failed");
                failed_chunks.push(i);
                continue;
            }

            chunk_ids.push(id);
        }

        if !failed_chunks.is_empty() {
            return Err(MultisenseError::PartialIngestion {
                document_id: document_id.to_string(),
                failed_chunks,
                stored_chunks: chunk_ids.len(),
            });
        }

        metrics::counter!("multisense_chunks_ingested_total")
            .increment(chunk_ids.len() as u64);
        info!(
            document_id,
            chunks = chunk_ids.len(),
            "document ingested"
        );

        Ok(IngestionReport {
            document_id: document_id.to_string(),
            chunks_created: chunk_ids.len(),
            chunk_ids,
        })
    }

    /// Removes a document's chunks from the index. Returns the number removed.
    pub async fn delete_document(&self, document_id: &str) -> Result<usize, MultisenseError> {
        let removed = self.index.delete_document(document_id).await?;
        info!(document_id, removed, "document removed from index");
        Ok(removed)
    }

    /// Retrieves the top `k` chunks relevant to `query_text`.
    ///
    /// Results are ordered by similarity descending with ties broken by
    /// ascending sequence index, then ascending document id -- identical
    /// inputs always produce identical output order. Chunks below the
    /// configured minimum similarity are dropped. An empty index, or a query
    /// nothing matches, yields an empty sequence: "no context found" is a
    /// valid, common outcome, not a failure.
    pub async fn retrieve(
        &self,
        query_text: &str,
        k: usize,
        document_filter: Option<&[String]>,
    ) -> Result<Vec<RetrievalResult>, MultisenseError> {
        if k == 0 {
            return Err(MultisenseError::InvalidInput(
                "retrieval k must be at least 1".to_string(),
            ));
        }

        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![query_text.to_string()],
            })
            .await?;
        let query_embedding = output.embeddings.into_iter().next().ok_or_else(|| {
            MultisenseError::Embedding {
                message: "gateway returned no embedding for query".to_string(),
                source: None,
            }
        })?;

        let matches = self.index.query(&query_embedding, k, document_filter).await?;

        let mut results: Vec<RetrievalResult> = matches
            .into_iter()
            .filter(|m| m.score >= self.config.min_similarity)
            .map(|m| RetrievalResult {
                chunk_id: m.chunk_id,
                text: m.text,
                score: m.score,
                source_document_id: m.document_id,
                sequence_index: m.sequence_index,
            })
            .collect();

        // The index contract already orders matches; re-assert the full
        // ordering so every VectorIndex implementation yields identical
        // results for identical inputs.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.sequence_index.cmp(&b.sequence_index))
                .then_with(|| a.source_document_id.cmp(&b.source_document_id))
        });
        results.truncate(k);

        metrics::counter!("multisense_retrievals_total").increment(1);
        debug!(
            query_len = query_text.len(),
            k,
            hits = results.len(),
            "retrieval completed"
        );

        Ok(results)
    }
}
