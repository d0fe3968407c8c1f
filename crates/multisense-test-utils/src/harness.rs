// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete pipeline with mock gateways, a temp
//! SQLite chunk store, conversation memory, and the orchestrator. Tests are
//! independent and order-insensitive: every harness owns its own temp
//! database and its own memory.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use multisense_agent::{HandleOptions, Orchestrator};
use multisense_config::model::RagConfig;
use multisense_core::error::MultisenseError;
use multisense_core::types::{
    InboundMessage, IngestionReport, MessagePayload, OrchestratorResult,
};
use multisense_memory::ConversationMemory;
use multisense_rag::RagEngine;
use multisense_storage::SqliteVectorIndex;

use crate::mock_gateways::{MockCaptioner, MockEmbedder, MockGenerator, MockTranscriber};

/// Builder for creating test environments with configurable mocks.
pub struct TestHarnessBuilder {
    generator_responses: Vec<String>,
    generator_fails: bool,
    transcriber: MockTranscriber,
    captioner: MockCaptioner,
    embedder_fail_on: Vec<usize>,
    max_turns: usize,
    ttl: Duration,
    rag_config: RagConfig,
    system_prompt: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            generator_responses: Vec::new(),
            generator_fails: false,
            transcriber: MockTranscriber::new(),
            captioner: MockCaptioner::new(),
            embedder_fail_on: Vec::new(),
            max_turns: 20,
            ttl: Duration::from_secs(3600),
            rag_config: RagConfig::default(),
            system_prompt: None,
        }
    }

    /// Set mock generator responses.
    pub fn with_generator_responses(mut self, responses: Vec<String>) -> Self {
        self.generator_responses = responses;
        self
    }

    /// Make every generation call fail.
    pub fn with_failing_generator(mut self) -> Self {
        self.generator_fails = true;
        self
    }

    /// Set the transcript returned for voice messages.
    pub fn with_transcript(mut self, transcript: &str) -> Self {
        self.transcriber = MockTranscriber::with_transcript(transcript.to_string());
        self
    }

    /// Make every transcription call fail.
    pub fn with_failing_transcriber(mut self) -> Self {
        self.transcriber = MockTranscriber::failing();
        self
    }

    /// Make transcription succeed but return an empty transcript.
    pub fn with_empty_transcript(mut self) -> Self {
        self.transcriber = MockTranscriber::empty();
        self
    }

    /// Set the caption returned for image messages.
    pub fn with_caption(mut self, caption: &str) -> Self {
        self.captioner = MockCaptioner::with_caption(caption.to_string());
        self
    }

    /// Make every captioning call fail.
    pub fn with_failing_captioner(mut self) -> Self {
        self.captioner = MockCaptioner::failing();
        self
    }

    /// Make the embedding gateway fail on the given call indices.
    pub fn with_embedder_failing_on(mut self, fail_on: Vec<usize>) -> Self {
        self.embedder_fail_on = fail_on;
        self
    }

    /// Set conversation memory bounds.
    pub fn with_memory_limits(mut self, max_turns: usize, ttl: Duration) -> Self {
        self.max_turns = max_turns;
        self.ttl = ttl;
        self
    }

    /// Override the RAG configuration.
    pub fn with_rag_config(mut self, config: RagConfig) -> Self {
        self.rag_config = config;
        self
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    /// Build the test harness, creating all subsystems.
    pub async fn build(self) -> Result<TestHarness, MultisenseError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| MultisenseError::Storage {
            source: e.into(),
        })?;
        let db_path = temp_dir.path().join("test-chunks.db");
        let index = Arc::new(SqliteVectorIndex::open(&db_path).await?);

        let embedder = Arc::new(if self.embedder_fail_on.is_empty() {
            MockEmbedder::new()
        } else {
            MockEmbedder::failing_on(self.embedder_fail_on)
        });

        let rag = Arc::new(RagEngine::new(
            embedder.clone(),
            index.clone(),
            self.rag_config,
        ));

        let memory = Arc::new(ConversationMemory::new(self.max_turns, self.ttl));

        let generator = Arc::new(if self.generator_fails {
            MockGenerator::failing()
        } else {
            MockGenerator::with_responses(self.generator_responses)
        });

        let orchestrator = Orchestrator::new(
            generator.clone(),
            Arc::new(self.transcriber),
            Arc::new(self.captioner),
            rag.clone(),
            memory.clone(),
            self.system_prompt,
        );

        Ok(TestHarness {
            orchestrator,
            generator,
            embedder,
            rag,
            memory,
            index,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock gateways and a temp chunk store.
pub struct TestHarness {
    /// The orchestrator under test.
    pub orchestrator: Orchestrator,
    /// The mock generation gateway.
    pub generator: Arc<MockGenerator>,
    /// The mock embedding gateway.
    pub embedder: Arc<MockEmbedder>,
    /// The RAG engine (shared with the orchestrator).
    pub rag: Arc<RagEngine>,
    /// Conversation memory (shared with the orchestrator).
    pub memory: Arc<ConversationMemory>,
    /// The SQLite chunk store (temp file, removed on drop).
    pub index: Arc<SqliteVectorIndex>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    fn message(session_id: &str, payload: MessagePayload) -> InboundMessage {
        InboundMessage {
            id: format!("msg-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default()),
            session_id: session_id.to_string(),
            payload,
            received_at: Utc::now(),
        }
    }

    /// Send a text message through the full pipeline with RAG enabled.
    pub async fn send_text(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<OrchestratorResult, MultisenseError> {
        self.send_text_with(session_id, text, HandleOptions { use_rag: true })
            .await
    }

    /// Send a text message with explicit options.
    pub async fn send_text_with(
        &self,
        session_id: &str,
        text: &str,
        options: HandleOptions,
    ) -> Result<OrchestratorResult, MultisenseError> {
        let message = Self::message(
            session_id,
            MessagePayload::Text {
                text: text.to_string(),
            },
        );
        self.orchestrator.handle(message, options).await
    }

    /// Send a voice message through the full pipeline.
    pub async fn send_voice(
        &self,
        session_id: &str,
        audio: Vec<u8>,
    ) -> Result<OrchestratorResult, MultisenseError> {
        let message = Self::message(
            session_id,
            MessagePayload::Voice {
                audio,
                media_uri: Some("media/test-voice".to_string()),
            },
        );
        self.orchestrator.handle(message, HandleOptions::default()).await
    }

    /// Send an image message through the full pipeline.
    pub async fn send_image(
        &self,
        session_id: &str,
        image: Vec<u8>,
        user_text: Option<&str>,
    ) -> Result<OrchestratorResult, MultisenseError> {
        let message = Self::message(
            session_id,
            MessagePayload::Image {
                image,
                user_text: user_text.map(|s| s.to_string()),
                media_uri: Some("media/test-image".to_string()),
            },
        );
        self.orchestrator.handle(message, HandleOptions::default()).await
    }

    /// Send a document message (ingestion path).
    pub async fn send_document(
        &self,
        session_id: &str,
        document_id: &str,
        text: &str,
    ) -> Result<OrchestratorResult, MultisenseError> {
        let message = Self::message(
            session_id,
            MessagePayload::Document {
                document_id: document_id.to_string(),
                text: text.to_string(),
                metadata: HashMap::new(),
            },
        );
        self.orchestrator.handle(message, HandleOptions::default()).await
    }

    /// Ingest a document through the outward interface.
    pub async fn ingest(
        &self,
        document_id: &str,
        text: &str,
    ) -> Result<IngestionReport, MultisenseError> {
        self.orchestrator
            .ingest_document(document_id, text, &HashMap::new())
            .await
    }
}
