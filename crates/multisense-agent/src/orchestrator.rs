// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The multi-modal orchestrator: one inbound message in, one result out.
//!
//! Per-kind behavior:
//! - `text`: the payload text is the normalized input
//! - `voice`: transcription gateway first; an empty transcript aborts
//! - `image`: captioning gateway; caption merges with any user text
//! - `document`: RAG ingestion only -- no generation, no memory writes
//!
//! Ordering is strict: transcription/captioning completes before retrieval,
//! retrieval before generation, and the two memory appends happen only after
//! generation succeeds. A request that fails at any earlier stage leaves the
//! session's history untouched.

use std::sync::Arc;
use std::time::Instant;

use multisense_core::error::MultisenseError;
use multisense_core::traits::{
    CaptioningGateway, GenerationGateway, TranscriptionGateway,
};
use multisense_core::types::{
    ConversationTurn, InboundMessage, IngestionReport, MessagePayload, NormalizedInput,
    OrchestratorResult, ReplyResult, RetrievalResult, Role,
};
use multisense_memory::ConversationMemory;
use multisense_rag::RagEngine;
use tracing::{debug, info};

use crate::prompt;

/// Per-request options supplied by the boundary layer.
#[derive(Debug, Clone, Copy)]
pub struct HandleOptions {
    /// Whether to augment generation with retrieved document context.
    pub use_rag: bool,
}

impl Default for HandleOptions {
    fn default() -> Self {
        Self { use_rag: true }
    }
}

/// Central orchestrator for all inbound message kinds.
///
/// Holds its collaborators as injected trait objects; nothing here is
/// process-global, so tests wire in doubles and independent instances never
/// share state.
pub struct Orchestrator {
    generator: Arc<dyn GenerationGateway>,
    transcriber: Arc<dyn TranscriptionGateway>,
    captioner: Arc<dyn CaptioningGateway>,
    rag: Arc<RagEngine>,
    memory: Arc<ConversationMemory>,
    system_prompt: Option<String>,
}

impl Orchestrator {
    /// Creates an orchestrator over the given collaborators.
    pub fn new(
        generator: Arc<dyn GenerationGateway>,
        transcriber: Arc<dyn TranscriptionGateway>,
        captioner: Arc<dyn CaptioningGateway>,
        rag: Arc<RagEngine>,
        memory: Arc<ConversationMemory>,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            generator,
            transcriber,
            captioner,
            rag,
            memory,
            system_prompt,
        }
    }

    /// Handles a single inbound message.
    ///
    /// Text, voice, and image messages produce a generated reply and record
    /// exactly one user turn and one assistant turn -- both appended only
    /// after generation succeeds. Document messages delegate to ingestion and
    /// record nothing.
    pub async fn handle(
        &self,
        message: InboundMessage,
        options: HandleOptions,
    ) -> Result<OrchestratorResult, MultisenseError> {
        let started = Instant::now();
        let kind = message.kind();
        let session_id = message.session_id.clone();
        metrics::counter!("multisense_messages_total", "kind" => kind.to_string())
            .increment(1);
        debug!(session_id = %session_id, kind = %kind, message_id = %message.id, "handling inbound message");

        let normalized = match message.payload {
            MessagePayload::Text { text } => NormalizedInput {
                session_id,
                text,
                source_kind: kind,
                attachments: Vec::new(),
            },
            MessagePayload::Voice { audio, media_uri } => {
                let transcript = self.transcriber.transcribe(&audio).await?;
                if transcript.trim().is_empty() {
                    return Err(MultisenseError::Transcription {
                        message: "gateway returned an empty transcript".to_string(),
                        source: None,
                    });
                }
                debug!(session_id = %session_id, chars = transcript.len(), "voice transcribed");
                NormalizedInput {
                    session_id,
                    text: transcript,
                    source_kind: kind,
                    attachments: media_uri.into_iter().collect(),
                }
            }
            MessagePayload::Image {
                image,
                user_text,
                media_uri,
            } => {
                let caption = self.captioner.caption(&image).await?;
                debug!(session_id = %session_id, chars = caption.len(), "image captioned");
                let text = match user_text {
                    Some(user_text) if !user_text.trim().is_empty() => {
                        format!("{user_text}\n\nImage description: {caption}")
                    }
                    _ => format!("Image description: {caption}"),
                };
                NormalizedInput {
                    session_id,
                    text,
                    source_kind: kind,
                    attachments: media_uri.into_iter().collect(),
                }
            }
            MessagePayload::Document {
                document_id,
                text,
                metadata,
            } => {
                let report = self.rag.ingest(&document_id, &text, &metadata).await?;
                info!(
                    session_id = %session_id,
                    document_id = %report.document_id,
                    chunks = report.chunks_created,
                    "document ingested via message path"
                );
                return Ok(OrchestratorResult::Ingestion(report));
            }
        };

        // Retrieval runs after normalization and before generation.
        let retrieved = if options.use_rag {
            self.rag
                .retrieve(&normalized.text, self.rag.config().top_k, None)
                .await?
        } else {
            Vec::new()
        };
        let sources = distinct_sources(&retrieved);

        let history = self.memory.history(&normalized.session_id);
        let request = prompt::build_request(
            self.system_prompt.as_deref(),
            &history,
            &retrieved,
            &normalized.text,
            self.rag.config().max_context_chars,
        );

        let reply_text = self.generator.generate(request).await?;

        // Generation succeeded: record both turns, exactly once.
        self.memory.append(
            &normalized.session_id,
            ConversationTurn::new(Role::User, normalized.text.clone(), Vec::new()),
        );
        self.memory.append(
            &normalized.session_id,
            ConversationTurn::new(Role::Assistant, reply_text.clone(), sources.clone()),
        );

        let processing_time = started.elapsed();
        metrics::histogram!("multisense_processing_seconds")
            .record(processing_time.as_secs_f64());
        info!(
            session_id = %normalized.session_id,
            kind = %kind,
            elapsed_ms = processing_time.as_millis() as u64,
            sources = sources.len(),
            "message processed"
        );

        Ok(OrchestratorResult::Reply(ReplyResult {
            reply_text,
            session_id: normalized.session_id,
            sources,
            processing_time,
            source_kind: kind,
        }))
    }

    /// Ingests a document directly (outward interface for the boundary layer).
    pub async fn ingest_document(
        &self,
        document_id: &str,
        text: &str,
        metadata: &std::collections::HashMap<String, String>,
    ) -> Result<IngestionReport, MultisenseError> {
        self.rag.ingest(document_id, text, metadata).await
    }

    /// Removes an ingested document from the knowledge base.
    /// Returns the number of chunks removed.
    pub async fn forget_document(&self, document_id: &str) -> Result<usize, MultisenseError> {
        self.rag.delete_document(document_id).await
    }

    /// Returns a session's turns, oldest first.
    pub fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.memory.history(session_id)
    }

    /// Removes a session's history. Returns whether a session existed.
    pub fn clear_session(&self, session_id: &str) -> bool {
        self.memory.clear(session_id)
    }

    /// Ids of sessions with live (non-expired) history.
    pub fn active_sessions(&self) -> Vec<String> {
        self.memory.active_sessions()
    }
}

/// Distinct source document ids, preserving retrieval order.
fn distinct_sources(results: &[RetrievalResult]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    results
        .iter()
        .filter(|r| seen.insert(r.source_document_id.as_str()))
        .map(|r| r.source_document_id.clone())
        .collect()
}
