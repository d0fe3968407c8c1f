// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite vector index with BLOB embeddings and in-process cosine ranking.

use std::cmp::Ordering;
use std::path::Path;

use async_trait::async_trait;
use multisense_core::error::MultisenseError;
use multisense_core::traits::VectorIndex;
use multisense_core::types::{cosine_similarity, ChunkMatch, DocumentChunk};
use tokio_rusqlite::Connection;

use crate::{blob_to_vec, vec_to_blob};

/// Helper to convert tokio_rusqlite errors into MultisenseError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> MultisenseError {
    MultisenseError::Storage {
        source: Box::new(e),
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS chunks (
    chunk_id TEXT PRIMARY KEY NOT NULL,
    document_id TEXT NOT NULL,
    sequence_index INTEGER NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    metadata TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);
";

/// Persistent chunk store backed by SQLite.
///
/// Embeddings are stored as little-endian f32 BLOBs; similarity is computed
/// in process over the candidate set. At the scale of a personal knowledge
/// base a full cosine scan outperforms index maintenance.
pub struct SqliteVectorIndex {
    conn: Connection,
}

impl SqliteVectorIndex {
    /// Opens (or creates) the database at `path` and applies the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, MultisenseError> {
        let conn = Connection::open(path.as_ref())
            .await
            .map_err(|e| storage_err(e.into()))?;
        Self::with_connection(conn).await
    }

    /// Opens an in-memory database. Used by tests and the harness.
    pub async fn open_in_memory() -> Result<Self, MultisenseError> {
        let conn = Connection::open_in_memory().await.map_err(|e| storage_err(e.into()))?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self, MultisenseError> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(storage_err)?;
        Ok(Self { conn })
    }

    /// Ids of a document's stored chunks, in sequence order.
    pub async fn chunk_ids_for(
        &self,
        document_id: &str,
    ) -> Result<Vec<String>, MultisenseError> {
        let document_id = document_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT chunk_id FROM chunks WHERE document_id = ?1 ORDER BY sequence_index",
                )?;
                let ids = stmt
                    .query_map(rusqlite::params![document_id], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(ids)
            })
            .await
            .map_err(storage_err)
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn upsert(&self, chunk: &DocumentChunk) -> Result<(), MultisenseError> {
        let chunk_id = chunk.chunk_id.clone();
        let document_id = chunk.document_id.clone();
        let sequence_index = chunk.sequence_index;
        let text = chunk.text.clone();
        let embedding_blob = vec_to_blob(&chunk.embedding);
        let metadata = serde_json::to_string(&chunk.metadata)
            .map_err(|e| MultisenseError::Storage { source: Box::new(e) })?;

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO chunks (chunk_id, document_id, sequence_index, text, embedding, metadata) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![chunk_id, document_id, sequence_index, text, embedding_blob, metadata],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&[String]>,
    ) -> Result<Vec<ChunkMatch>, MultisenseError> {
        let query_vec = vector.to_vec();
        let filter = filter.map(|ids| ids.to_vec());

        self.conn
            .call(move |conn| {
                // An explicit empty filter matches nothing.
                if matches!(filter.as_deref(), Some([])) {
                    return Ok(Vec::new());
                }

                let rows: Vec<(String, String, u32, String, Vec<u8>)> = match &filter {
                    Some(ids) => {
                        let placeholders: Vec<String> =
                            (1..=ids.len()).map(|i| format!("?{i}")).collect();
                        let sql = format!(
                            "SELECT chunk_id, document_id, sequence_index, text, embedding FROM chunks WHERE document_id IN ({})",
                            placeholders.join(", ")
                        );
                        let mut stmt = conn.prepare(&sql)?;
                        let params: Vec<&dyn rusqlite::types::ToSql> = ids
                            .iter()
                            .map(|id| id as &dyn rusqlite::types::ToSql)
                            .collect();
                        stmt.query_map(params.as_slice(), row_to_tuple)?
                            .collect::<Result<_, _>>()?
                    }
                    None => {
                        let mut stmt = conn.prepare(
                            "SELECT chunk_id, document_id, sequence_index, text, embedding FROM chunks",
                        )?;
                        stmt.query_map([], row_to_tuple)?
                            .collect::<Result<_, _>>()?
                    }
                };

                let mut candidates: Vec<ChunkMatch> = rows
                    .into_iter()
                    .filter_map(|(chunk_id, document_id, sequence_index, text, blob)| {
                        let embedding = blob_to_vec(&blob);
                        if embedding.len() != query_vec.len() {
                            return None;
                        }
                        let score = cosine_similarity(&query_vec, &embedding);
                        Some(ChunkMatch {
                            chunk_id,
                            document_id,
                            sequence_index,
                            text,
                            score,
                        })
                    })
                    .collect();

                candidates.sort_by(|a, b| rank_matches(a, b));
                candidates.truncate(k);
                Ok(candidates)
            })
            .await
            .map_err(storage_err)
    }

    async fn delete_document(&self, document_id: &str) -> Result<usize, MultisenseError> {
        let document_id = document_id.to_string();
        self.conn
            .call(move |conn| {
                let removed = conn.execute(
                    "DELETE FROM chunks WHERE document_id = ?1",
                    rusqlite::params![document_id],
                )?;
                Ok(removed)
            })
            .await
            .map_err(storage_err)
    }

    async fn count(&self) -> Result<usize, MultisenseError> {
        self.conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(storage_err)
    }
}

fn row_to_tuple(
    row: &rusqlite::Row<'_>,
) -> Result<(String, String, u32, String, Vec<u8>), rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

/// Deterministic match ordering: score descending, then sequence_index
/// ascending, then document_id ascending.
pub fn rank_matches(a: &ChunkMatch, b: &ChunkMatch) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.sequence_index.cmp(&b.sequence_index))
        .then_with(|| a.document_id.cmp(&b.document_id))
}
