// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed chunk store for MultiSense.
//!
//! Persists document chunks with their embeddings as BLOB columns and answers
//! nearest-neighbor queries with an in-process cosine scan. Upserts are keyed
//! by chunk id, which makes document re-ingestion idempotent.

pub mod index;

pub use index::SqliteVectorIndex;

/// Convert an f32 vector to little-endian bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert a SQLite BLOB back to an f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}
