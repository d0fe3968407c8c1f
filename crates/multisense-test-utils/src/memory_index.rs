// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory vector index for tests that do not need SQLite.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use multisense_core::error::MultisenseError;
use multisense_core::traits::VectorIndex;
use multisense_core::types::{cosine_similarity, ChunkMatch, DocumentChunk};
use multisense_storage::index::rank_matches;

/// A `VectorIndex` over a plain `HashMap`, keyed by chunk id.
///
/// Matches the SQLite index's ranking semantics exactly, so tests can swap
/// either implementation behind the trait.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    chunks: RwLock<HashMap<String, DocumentChunk>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, chunk: &DocumentChunk) -> Result<(), MultisenseError> {
        self.chunks
            .write()
            .await
            .insert(chunk.chunk_id.clone(), chunk.clone());
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&[String]>,
    ) -> Result<Vec<ChunkMatch>, MultisenseError> {
        let chunks = self.chunks.read().await;
        let mut matches: Vec<ChunkMatch> = chunks
            .values()
            .filter(|chunk| match filter {
                Some(ids) => ids.iter().any(|id| *id == chunk.document_id),
                None => true,
            })
            .filter(|chunk| chunk.embedding.len() == vector.len())
            .map(|chunk| ChunkMatch {
                chunk_id: chunk.chunk_id.clone(),
                document_id: chunk.document_id.clone(),
                sequence_index: chunk.sequence_index,
                text: chunk.text.clone(),
                score: cosine_similarity(vector, &chunk.embedding),
            })
            .collect();

        matches.sort_by(rank_matches);
        matches.truncate(k);
        Ok(matches)
    }

    async fn delete_document(&self, document_id: &str) -> Result<usize, MultisenseError> {
        let mut chunks = self.chunks.write().await;
        let before = chunks.len();
        chunks.retain(|_, chunk| chunk.document_id != document_id);
        Ok(before - chunks.len())
    }

    async fn count(&self) -> Result<usize, MultisenseError> {
        Ok(self.chunks.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(document_id: &str, seq: u32, embedding: Vec<f32>) -> DocumentChunk {
        DocumentChunk {
            chunk_id: format!("{document_id}-{seq:05}"),
            document_id: document_id.to_string(),
            sequence_index: seq,
            text: format!("chunk {seq}"),
            embedding,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_by_chunk_id() {
        let index = InMemoryVectorIndex::new();
        index.upsert(&chunk("doc", 0, vec![1.0, 0.0])).await.unwrap();
        index.upsert(&chunk("doc", 0, vec![0.0, 1.0])).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn query_matches_sqlite_ordering_semantics() {
        let index = InMemoryVectorIndex::new();
        index.upsert(&chunk("doc-b", 0, vec![1.0, 0.0])).await.unwrap();
        index.upsert(&chunk("doc-a", 0, vec![1.0, 0.0])).await.unwrap();

        let matches = index.query(&[1.0, 0.0], 5, None).await.unwrap();
        // Tied score, tied sequence: document id breaks the tie.
        assert_eq!(matches[0].document_id, "doc-a");
        assert_eq!(matches[1].document_id, "doc-b");
    }

    #[tokio::test]
    async fn empty_index_query_is_empty() {
        let index = InMemoryVectorIndex::new();
        assert!(index.query(&[1.0, 0.0], 5, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_document_counts_removals() {
        let index = InMemoryVectorIndex::new();
        index.upsert(&chunk("doc-a", 0, vec![1.0])).await.unwrap();
        index.upsert(&chunk("doc-a", 1, vec![1.0])).await.unwrap();
        index.upsert(&chunk("doc-b", 0, vec![1.0])).await.unwrap();

        assert_eq!(index.delete_document("doc-a").await.unwrap(), 2);
        assert_eq!(index.count().await.unwrap(), 1);
    }
}
