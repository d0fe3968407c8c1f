// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for MultiSense.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, producing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level MultiSense configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MultisenseConfig {
    /// Agent identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Hugging Face Inference API settings.
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,

    /// Retrieval-augmented generation settings.
    #[serde(default)]
    pub rag: RagConfig,

    /// Conversation memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Chunk store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "multisense".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Hugging Face Inference API configuration.
///
/// All four gateway capabilities (chat, embeddings, speech-to-text,
/// image captioning) ride on the serverless Inference API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HuggingFaceConfig {
    /// API token. Empty means unauthenticated (rate-limited) access.
    #[serde(default)]
    pub api_token: String,

    /// Chat completion model id.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Sentence-embedding model id.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Speech-to-text model id.
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,

    /// Image-to-text model id.
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Maximum tokens per generated reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            whisper_model: default_whisper_model(),
            vision_model: default_vision_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_chat_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.3".to_string()
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_whisper_model() -> String {
    "openai/whisper-large-v3".to_string()
}

fn default_vision_model() -> String {
    "Salesforce/blip-image-captioning-large".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

/// Retrieval-augmented generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RagConfig {
    /// Target chunk size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters.
    /// Must be strictly smaller than `chunk_size`.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum cosine similarity for a chunk to enter the context window.
    /// Chunks scoring below this are dropped, not errors.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    /// Upper bound on the assembled retrieved-context block, in characters.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            min_similarity: default_min_similarity(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    5
}

fn default_min_similarity() -> f32 {
    0.25
}

fn default_max_context_chars() -> usize {
    6000
}

/// Conversation memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Maximum turns kept per session; oldest are evicted first.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Seconds of idle time before a session expires.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_max_turns() -> usize {
    20
}

fn default_ttl_secs() -> u64 {
    86_400 // 24 hours
}

/// Chunk store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file holding document chunks.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "multisense.db".to_string()
}
