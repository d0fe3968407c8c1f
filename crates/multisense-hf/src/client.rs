// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Hugging Face Inference API.
//!
//! Provides [`HfClient`], which implements all four MultiSense gateway
//! contracts: generation, embedding, transcription, and captioning.

use std::time::Duration;

use async_trait::async_trait;
use multisense_config::model::HuggingFaceConfig;
use multisense_core::error::MultisenseError;
use multisense_core::traits::{
    CaptioningGateway, EmbeddingGateway, GenerationGateway, TranscriptionGateway,
};
use multisense_core::types::{EmbeddingInput, EmbeddingOutput, GenerationRequest};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::types::{
    extract_caption, extract_transcript, normalize_embedding, ApiChatMessage,
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse,
    FeatureExtractionRequest,
};

/// Base URL for the serverless Inference API.
const API_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Which gateway produced an error; used to map HTTP failures onto the
/// matching error variant.
#[derive(Debug, Clone, Copy)]
enum Capability {
    Generation,
    Embedding,
    Transcription,
    Captioning,
}

impl Capability {
    fn to_error(
        self,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> MultisenseError {
        match self {
            Capability::Generation => MultisenseError::Generation { message, source },
            Capability::Embedding => MultisenseError::Embedding { message, source },
            Capability::Transcription => MultisenseError::Transcription { message, source },
            Capability::Captioning => MultisenseError::Captioning { message, source },
        }
    }
}

/// HTTP client for Hugging Face Inference API communication.
///
/// Manages authentication headers, connection pooling, and a single retry
/// for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct HfClient {
    client: reqwest::Client,
    config: HuggingFaceConfig,
    base_url: String,
    max_retries: u32,
}

impl HfClient {
    /// Creates a new Inference API client from configuration.
    pub fn new(config: &HuggingFaceConfig) -> Result<Self, MultisenseError> {
        let mut headers = HeaderMap::new();
        if !config.api_token.is_empty() {
            let value = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
                .map_err(|e| {
                    MultisenseError::Config(format!("invalid API token header value: {e}"))
                })?;
            headers.insert("authorization", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| MultisenseError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: config.clone(),
            base_url: API_BASE_URL.to_string(),
            max_retries: 1,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{model}", self.base_url)
    }

    /// POST a request, retrying once on transient upstream errors.
    ///
    /// `build` constructs a fresh request for each attempt; bodies are not
    /// reusable across sends.
    async fn post_with_retry<F>(
        &self,
        capability: Capability,
        build: F,
    ) -> Result<serde_json::Value, MultisenseError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying inference request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = build().send().await.map_err(|e| {
                capability.to_error(format!("HTTP request failed: {e}"), Some(Box::new(e)))
            })?;

            let status = response.status();
            debug!(status = %status, attempt, "inference response received");

            if status.is_success() {
                return response.json::<serde_json::Value>().await.map_err(|e| {
                    capability.to_error(
                        format!("failed to decode response body: {e}"),
                        Some(Box::new(e)),
                    )
                });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(capability.to_error(
                    format!("API returned {status}: {body}"),
                    None,
                ));
                continue;
            }

            // Non-transient error or exhausted retries.
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!("Inference API error ({status}): {}", api_err.error)
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(capability.to_error(message, None));
        }

        Err(last_error.unwrap_or_else(|| {
            capability.to_error("request failed after retries".to_string(), None)
        }))
    }
}

/// Whether an HTTP status indicates a transient error worth one retry.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::SERVICE_UNAVAILABLE
    )
}

#[async_trait]
impl GenerationGateway for HfClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, MultisenseError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system_prompt {
            messages.push(ApiChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        for msg in &request.messages {
            messages.push(ApiChatMessage {
                role: msg.role.to_string(),
                content: msg.content.clone(),
            });
        }

        let body = ChatCompletionRequest {
            model: self.config.chat_model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.model_url(&self.config.chat_model)
        );
        let value = self
            .post_with_retry(Capability::Generation, || {
                self.client.post(&url).json(&body)
            })
            .await?;

        let response: ChatCompletionResponse =
            serde_json::from_value(value).map_err(|e| MultisenseError::Generation {
                message: format!("unexpected chat completion response: {e}"),
                source: Some(Box::new(e)),
            })?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| MultisenseError::Generation {
                message: "chat completion returned no choices".to_string(),
                source: None,
            })
    }
}

#[async_trait]
impl EmbeddingGateway for HfClient {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MultisenseError> {
        let url = self.model_url(&self.config.embedding_model);
        let mut embeddings = Vec::with_capacity(input.texts.len());

        // The feature-extraction pipeline is called once per text; batch
        // semantics across models are inconsistent enough that per-text calls
        // are the reliable shape.
        for text in &input.texts {
            let body = FeatureExtractionRequest {
                inputs: text.clone(),
            };
            let value = self
                .post_with_retry(Capability::Embedding, || {
                    self.client.post(&url).json(&body)
                })
                .await?;
            embeddings.push(normalize_embedding(&value)?);
        }

        let dimensions = embeddings.first().map(|e| e.len()).unwrap_or(0);
        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}

#[async_trait]
impl TranscriptionGateway for HfClient {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, MultisenseError> {
        let url = self.model_url(&self.config.whisper_model);
        let audio = audio.to_vec();

        let value = self
            .post_with_retry(Capability::Transcription, || {
                self.client
                    .post(&url)
                    .header("content-type", "application/octet-stream")
                    .body(audio.clone())
            })
            .await?;

        extract_transcript(&value).ok_or_else(|| MultisenseError::Transcription {
            message: format!("unexpected ASR response shape: {value}"),
            source: None,
        })
    }
}

#[async_trait]
impl CaptioningGateway for HfClient {
    async fn caption(&self, image: &[u8]) -> Result<String, MultisenseError> {
        let url = self.model_url(&self.config.vision_model);
        let image = image.to_vec();

        let value = self
            .post_with_retry(Capability::Captioning, || {
                self.client
                    .post(&url)
                    .header("content-type", "application/octet-stream")
                    .body(image.clone())
            })
            .await?;

        extract_caption(&value).ok_or_else(|| MultisenseError::Captioning {
            message: format!("unexpected image-to-text response shape: {value}"),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use multisense_core::types::{ChatMessage, Role};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_client(base_url: String) -> HfClient {
        let config = HuggingFaceConfig {
            api_token: "hf_test".to_string(),
            chat_model: "test/chat".to_string(),
            embedding_model: "test/embed".to_string(),
            whisper_model: "test/whisper".to_string(),
            vision_model: "test/vision".to_string(),
            max_tokens: 256,
            temperature: 0.7,
        };
        HfClient::new(&config).unwrap().with_base_url(base_url)
    }

    fn chat_request(text: &str) -> GenerationRequest {
        GenerationRequest {
            system_prompt: Some("You are a test assistant.".to_string()),
            messages: vec![ChatMessage {
                role: Role::User,
                content: text.to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn generate_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/chat/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "Hello from the model"}}
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let reply = client.generate(chat_request("hi")).await.unwrap();
        assert_eq!(reply, "Hello from the model");
    }

    #[tokio::test]
    async fn generate_maps_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/chat/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "invalid token"})),
            )
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let err = client.generate(chat_request("hi")).await.unwrap_err();
        match err {
            MultisenseError::Generation { message, .. } => {
                assert!(message.contains("invalid token"), "got: {message}");
            }
            other => panic!("expected Generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_retries_transient_error_once() {
        let server = MockServer::start().await;
        // First attempt: 503. Second attempt: success.
        Mock::given(method("POST"))
            .and(path("/models/test/chat/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/test/chat/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "recovered"}}]
            })))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let reply = client.generate(chat_request("hi")).await.unwrap();
        assert_eq!(reply, "recovered");
    }

    #[tokio::test]
    async fn embed_normalizes_pooled_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([0.1, 0.2, 0.3])))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let output = client
            .embed(EmbeddingInput {
                texts: vec!["hello".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(output.embeddings.len(), 1);
        assert_eq!(output.dimensions, 3);
    }

    #[tokio::test]
    async fn embed_mean_pools_token_matrix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/embed"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[1.0, 2.0], [3.0, 4.0]])),
            )
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let output = client
            .embed(EmbeddingInput {
                texts: vec!["hello".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(output.embeddings[0], vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn embed_one_request_per_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([0.5, 0.5])))
            .expect(3)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let output = client
            .embed(EmbeddingInput {
                texts: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(output.embeddings.len(), 3);
    }

    #[tokio::test]
    async fn transcribe_reads_text_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/whisper"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"text": "remind me tomorrow"})),
            )
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let transcript = client.transcribe(&[1, 2, 3]).await.unwrap();
        assert_eq!(transcript, "remind me tomorrow");
    }

    #[tokio::test]
    async fn transcribe_error_surfaces_as_transcription_variant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/whisper"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let err = client.transcribe(&[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, MultisenseError::Transcription { .. }));
    }

    #[tokio::test]
    async fn caption_reads_generated_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/vision"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"generated_text": "a dog running on a beach"}
            ])))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let caption = client.caption(&[9, 9, 9]).await.unwrap();
        assert_eq!(caption, "a dog running on a beach");
    }

    #[tokio::test]
    async fn caption_error_surfaces_as_captioning_variant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/vision"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        // 500 is transient: both attempts fail, then the error surfaces.
        let err = client.caption(&[9]).await.unwrap_err();
        assert!(matches!(err, MultisenseError::Captioning { .. }));
    }
}
