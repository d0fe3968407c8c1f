// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock gateway adapters for deterministic testing.
//!
//! Each mock implements one gateway contract with pre-configured behavior,
//! enabling fast tests without external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use multisense_core::error::MultisenseError;
use multisense_core::traits::{
    CaptioningGateway, EmbeddingGateway, GenerationGateway, TranscriptionGateway,
};
use multisense_core::types::{EmbeddingInput, EmbeddingOutput, GenerationRequest};

/// Dimensionality of mock embeddings.
pub const MOCK_EMBEDDING_DIMS: usize = 64;

/// Deterministic bag-of-words embedding.
///
/// Each word hashes into one of `dims` buckets; texts that share words land
/// close together in cosine space and disjoint texts land far apart, which is
/// enough signal for retrieval tests without a real model.
pub fn hash_embedding(text: &str, dims: usize) -> Vec<f32> {
    let mut vec = vec![0.0_f32; dims];
    for word in text.split_whitespace() {
        let digest = Sha256::digest(word.to_lowercase().as_bytes());
        let bucket = usize::from(digest[0]) % dims;
        vec[bucket] += 1.0;
    }
    vec
}

/// A mock generation gateway that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a default
/// "mock reply" text is returned. Every received request is recorded for
/// assertions.
pub struct MockGenerator {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    fail: bool,
}

impl MockGenerator {
    /// Create a mock generator with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Create a mock generator pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Create a mock generator that fails every call.
    pub fn failing() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// All requests received so far, in call order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationGateway for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, MultisenseError> {
        self.requests.lock().await.push(request);
        if self.fail {
            return Err(MultisenseError::Generation {
                message: "simulated generation outage".to_string(),
                source: None,
            });
        }
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string()))
    }
}

/// A mock embedding gateway with deterministic hash embeddings.
///
/// Optionally fails on specific call indices (0-based) to exercise
/// partial-ingestion paths.
pub struct MockEmbedder {
    dims: usize,
    calls: AtomicUsize,
    fail_on: Vec<usize>,
}

impl MockEmbedder {
    /// Create an embedder that never fails.
    pub fn new() -> Self {
        Self {
            dims: MOCK_EMBEDDING_DIMS,
            calls: AtomicUsize::new(0),
            fail_on: Vec::new(),
        }
    }

    /// Create an embedder that fails on the given call indices.
    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            dims: MOCK_EMBEDDING_DIMS,
            calls: AtomicUsize::new(0),
            fail_on,
        }
    }

    /// Number of embed calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingGateway for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MultisenseError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&call) {
            return Err(MultisenseError::Embedding {
                message: "simulated embedding outage".to_string(),
                source: None,
            });
        }
        let embeddings: Vec<Vec<f32>> = input
            .texts
            .iter()
            .map(|t| hash_embedding(t, self.dims))
            .collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dims,
        })
    }
}

/// A mock transcription gateway with a fixed transcript or failure.
pub struct MockTranscriber {
    transcript: String,
    fail: bool,
}

impl MockTranscriber {
    /// Create a transcriber returning a default transcript.
    pub fn new() -> Self {
        Self::with_transcript("mock transcript".to_string())
    }

    /// Create a transcriber returning the given transcript.
    pub fn with_transcript(transcript: String) -> Self {
        Self {
            transcript,
            fail: false,
        }
    }

    /// Create a transcriber whose gateway call fails.
    pub fn failing() -> Self {
        Self {
            transcript: String::new(),
            fail: true,
        }
    }

    /// Create a transcriber returning an empty transcript (gateway succeeds,
    /// transcript is unusable).
    pub fn empty() -> Self {
        Self::with_transcript(String::new())
    }
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionGateway for MockTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String, MultisenseError> {
        if self.fail {
            return Err(MultisenseError::Transcription {
                message: "simulated transcription outage".to_string(),
                source: None,
            });
        }
        Ok(self.transcript.clone())
    }
}

/// A mock captioning gateway with a fixed caption or failure.
pub struct MockCaptioner {
    caption: String,
    fail: bool,
}

impl MockCaptioner {
    /// Create a captioner returning a default caption.
    pub fn new() -> Self {
        Self::with_caption("a mock caption".to_string())
    }

    /// Create a captioner returning the given caption.
    pub fn with_caption(caption: String) -> Self {
        Self {
            caption,
            fail: false,
        }
    }

    /// Create a captioner whose gateway call fails.
    pub fn failing() -> Self {
        Self {
            caption: String::new(),
            fail: true,
        }
    }
}

impl Default for MockCaptioner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptioningGateway for MockCaptioner {
    async fn caption(&self, _image: &[u8]) -> Result<String, MultisenseError> {
        if self.fail {
            return Err(MultisenseError::Captioning {
                message: "simulated captioning outage".to_string(),
                source: None,
            });
        }
        Ok(self.caption.clone())
    }
}
