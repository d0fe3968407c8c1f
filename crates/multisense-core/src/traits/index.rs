// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector index trait for chunk storage and nearest-neighbor queries.

use async_trait::async_trait;

use crate::error::MultisenseError;
use crate::types::{ChunkMatch, DocumentChunk};

/// Persists `(vector, text, metadata)` tuples and answers nearest-neighbor
/// queries by cosine similarity.
///
/// Upserts are keyed by `chunk_id`: writing an existing id overwrites the
/// prior row, which is what makes re-ingestion idempotent. Concurrent
/// ingestion and retrieval against the same document may observe a partially
/// ingested state -- no cross-document transaction is implied.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite a chunk, keyed by its `chunk_id`.
    async fn upsert(&self, chunk: &DocumentChunk) -> Result<(), MultisenseError>;

    /// Return up to `k` chunks ranked by cosine similarity to `vector`,
    /// descending, with ties broken by ascending `sequence_index` then
    /// ascending `document_id`. `filter` restricts candidates to the given
    /// document ids. An empty index yields an empty result, not an error.
    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&[String]>,
    ) -> Result<Vec<ChunkMatch>, MultisenseError>;

    /// Remove all chunks of a document. Returns the number removed.
    async fn delete_document(&self, document_id: &str) -> Result<usize, MultisenseError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, MultisenseError>;
}
