// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the MultiSense pipeline.

use thiserror::Error;

/// The primary error type used across MultiSense gateways and core operations.
///
/// Gateway failures carry the upstream error as an optional boxed `source`;
/// the core never retries them internally -- retry policy belongs to the
/// gateway collaborator.
#[derive(Debug, Error)]
pub enum MultisenseError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The inbound message declared a kind outside the closed set
    /// {text, voice, image, document}. Fatal to the request, never retried.
    #[error("unsupported message kind: {kind}")]
    UnsupportedKind { kind: String },

    /// The transcription gateway failed or returned an empty transcript.
    #[error("transcription failed: {message}")]
    Transcription {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The captioning gateway failed.
    #[error("captioning failed: {message}")]
    Captioning {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The embedding gateway failed.
    #[error("embedding failed: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The generation gateway failed.
    #[error("generation failed: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Some chunks of an ingestion failed to embed or store. Chunks that were
    /// stored remain valid and queryable; `failed_chunks` holds the
    /// zero-based sequence indices that did not make it. Re-ingesting the
    /// same document is safe (chunk ids are deterministic).
    #[error(
        "partial ingestion of document {document_id}: {stored_chunks} stored, {} failed",
        .failed_chunks.len()
    )]
    PartialIngestion {
        document_id: String,
        failed_chunks: Vec<usize>,
        stored_chunks: usize,
    },

    /// Chunk store / vector index errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Caller-supplied argument outside the accepted domain (e.g. `k == 0`).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
