// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the MultiSense pipeline.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::MultisenseError;

/// The closed set of message kinds the orchestrator recognizes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Voice,
    Image,
    Document,
}

impl MessageKind {
    /// Parse a wire-format kind string.
    ///
    /// The boundary layer calls this when decoding inbound payloads; anything
    /// outside the closed set is an [`MultisenseError::UnsupportedKind`].
    pub fn parse(value: &str) -> Result<Self, MultisenseError> {
        value
            .parse()
            .map_err(|_| MultisenseError::UnsupportedKind {
                kind: value.to_string(),
            })
    }
}

/// Kind-specific payload of an inbound message.
///
/// The variant IS the classification: dispatch over this enum is exhaustive,
/// so a message that deserialized successfully always has a handling path.
#[derive(Debug, Clone)]
pub enum MessagePayload {
    /// Plain text from the user.
    Text { text: String },
    /// A voice note. `media_uri` is the channel-side attachment reference.
    Voice {
        audio: Vec<u8>,
        media_uri: Option<String>,
    },
    /// A photo, optionally with a user caption/question.
    Image {
        image: Vec<u8>,
        user_text: Option<String>,
        media_uri: Option<String>,
    },
    /// A document to ingest into the knowledge base. The boundary layer has
    /// already extracted plain text from the original file format.
    Document {
        document_id: String,
        text: String,
        metadata: HashMap<String, String>,
    },
}

impl MessagePayload {
    /// The kind tag for this payload.
    pub fn kind(&self) -> MessageKind {
        match self {
            MessagePayload::Text { .. } => MessageKind::Text,
            MessagePayload::Voice { .. } => MessageKind::Voice,
            MessagePayload::Image { .. } => MessageKind::Image,
            MessagePayload::Document { .. } => MessageKind::Document,
        }
    }
}

/// An inbound message produced by the boundary layer. Immutable once created.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Channel-assigned message id.
    pub id: String,
    /// Conversation session this message belongs to.
    pub session_id: String,
    /// Kind-specific payload.
    pub payload: MessagePayload,
    /// When the boundary layer received the message.
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// The message kind, derived from the payload variant.
    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }
}

/// The kind-independent text form of an inbound message.
///
/// Transcription and captioning do not mutate the [`InboundMessage`]; they
/// produce one of these.
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    pub session_id: String,
    pub text: String,
    pub source_kind: MessageKind,
    /// Channel-side URIs of any media attachments, in arrival order.
    pub attachments: Vec<String>,
}

/// One bounded, ordered piece of an ingested document.
///
/// Created during ingestion, immutable thereafter, owned by the chunk store.
/// `sequence_index` is unique within a `document_id` and defines
/// reconstruction order; chunks never cross document boundaries.
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    pub chunk_id: String,
    pub document_id: String,
    pub sequence_index: u32,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: HashMap<String, String>,
}

/// A ranked match returned by a vector index query.
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub chunk_id: String,
    pub document_id: String,
    pub sequence_index: u32,
    pub text: String,
    /// Cosine similarity against the query vector.
    pub score: f32,
}

/// A retrieval hit handed to the orchestrator. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub chunk_id: String,
    pub text: String,
    pub score: f32,
    pub source_document_id: String,
    pub sequence_index: u32,
}

/// Result of a document ingestion.
#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub document_id: String,
    pub chunks_created: usize,
    /// Ids of the stored chunks, in sequence order.
    pub chunk_ids: Vec<String>,
}

/// Speaker role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in a conversation. Append-only; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Document ids that informed this turn (assistant turns only; empty for
    /// user turns and un-augmented replies).
    pub sources: Vec<String>,
}

impl ConversationTurn {
    /// Build a turn stamped with the current time.
    pub fn new(role: Role, text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
            sources,
        }
    }
}

/// A chat message handed to the generation gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// A fully assembled request for the generation gateway.
///
/// `messages` holds the ordered prior turns followed by the current
/// (possibly context-augmented) user input as the final user message.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
}

/// Input for an embedding gateway call.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output of an embedding gateway call.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

/// A generated reply plus its provenance.
#[derive(Debug, Clone)]
pub struct ReplyResult {
    pub reply_text: String,
    pub session_id: String,
    /// Distinct source document ids, in retrieval order.
    pub sources: Vec<String>,
    pub processing_time: Duration,
    pub source_kind: MessageKind,
}

/// What the orchestrator hands back: a generated reply for the
/// text/voice/image paths, or an ingestion report for the document path.
#[derive(Debug, Clone)]
pub enum OrchestratorResult {
    Reply(ReplyResult),
    Ingestion(IngestionReport),
}

impl OrchestratorResult {
    /// The reply, if this result came from a generation path.
    pub fn as_reply(&self) -> Option<&ReplyResult> {
        match self {
            OrchestratorResult::Reply(r) => Some(r),
            OrchestratorResult::Ingestion(_) => None,
        }
    }

    /// The ingestion report, if this result came from the document path.
    pub fn as_ingestion(&self) -> Option<&IngestionReport> {
        match self {
            OrchestratorResult::Ingestion(r) => Some(r),
            OrchestratorResult::Reply(_) => None,
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Magnitudes are normalized here, so inputs need not be unit length.
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have same length");
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
