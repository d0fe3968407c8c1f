// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway traits for hosted inference capabilities.
//!
//! Each gateway supplies exactly one capability through a blocking
//! request/response contract. A failed call surfaces immediately as an error;
//! any retry or backoff policy belongs to the implementing collaborator, not
//! to callers.

use async_trait::async_trait;

use crate::error::MultisenseError;
use crate::types::{EmbeddingInput, EmbeddingOutput, GenerationRequest};

/// Maps text to fixed-length numeric vectors.
///
/// Powers both document ingestion (chunk embeddings) and query-time
/// retrieval (query embeddings).
#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    /// Generates one embedding per input text, in input order.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MultisenseError>;
}

/// Maps an assembled prompt to generated reply text.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Produces a reply for the given conversation.
    async fn generate(&self, request: GenerationRequest) -> Result<String, MultisenseError>;
}

/// Maps raw audio bytes to a transcript.
#[async_trait]
pub trait TranscriptionGateway: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, MultisenseError>;
}

/// Maps raw image bytes to a descriptive caption.
#[async_trait]
pub trait CaptioningGateway: Send + Sync {
    async fn caption(&self, image: &[u8]) -> Result<String, MultisenseError>;
}
