// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the MultiSense configuration system.

use multisense_config::diagnostic::{suggest_key, ConfigError};
use multisense_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[agent]
name = "test-agent"
log_level = "debug"
system_prompt = "You are a test assistant."

[huggingface]
api_token = "hf_123"
chat_model = "mistralai/Mistral-7B-Instruct-v0.3"
max_tokens = 512
temperature = 0.5

[rag]
chunk_size = 800
chunk_overlap = 100
top_k = 3
min_similarity = 0.3
max_context_chars = 4000

[memory]
max_turns = 10
ttl_secs = 3600

[storage]
database_path = "/tmp/test.db"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "test-agent");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(
        config.agent.system_prompt.as_deref(),
        Some("You are a test assistant.")
    );
    assert_eq!(config.huggingface.api_token, "hf_123");
    assert_eq!(config.huggingface.max_tokens, 512);
    assert_eq!(config.rag.chunk_size, 800);
    assert_eq!(config.rag.chunk_overlap, 100);
    assert_eq!(config.rag.top_k, 3);
    assert_eq!(config.memory.max_turns, 10);
    assert_eq!(config.memory.ttl_secs, 3600);
    assert_eq!(config.storage.database_path, "/tmp/test.db");
}

/// Unknown field in [rag] section produces an error.
#[test]
fn unknown_field_in_rag_produces_error() {
    let toml = r#"
[rag]
chunk_sze = 500
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("chunk_sze"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = "";
    let config = load_config_from_str(toml).expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "multisense");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.agent.system_prompt.is_none());
    assert!(config.huggingface.api_token.is_empty());
    assert_eq!(
        config.huggingface.embedding_model,
        "sentence-transformers/all-MiniLM-L6-v2"
    );
    assert_eq!(config.rag.chunk_size, 1000);
    assert_eq!(config.rag.chunk_overlap, 200);
    assert_eq!(config.rag.top_k, 5);
    assert_eq!(config.memory.max_turns, 20);
    assert_eq!(config.memory.ttl_secs, 86_400);
    assert_eq!(config.storage.database_path, "multisense.db");
}

/// Environment variable MULTISENSE_RAG_TOP_K overrides rag.top_k in TOML.
#[test]
fn env_var_overrides_rag_top_k() {
    use figment::{
        providers::{Env, Format, Serialized, Toml},
        Figment, Jail,
    };
    use multisense_config::MultisenseConfig;

    Jail::expect_with(|jail| {
        jail.set_env("MULTISENSE_RAG_TOP_K", "9");

        let config: MultisenseConfig = Figment::new()
            .merge(Serialized::defaults(MultisenseConfig::default()))
            .merge(Toml::string("[rag]\ntop_k = 2\n"))
            .merge(Env::prefixed("MULTISENSE_").map(|key| {
                key.as_str().replacen("rag_", "rag.", 1).into()
            }))
            .extract()?;

        assert_eq!(config.rag.top_k, 9);
        Ok(())
    });
}

/// load_and_validate_str rejects semantically invalid values.
#[test]
fn validation_rejects_bad_overlap() {
    let toml = r#"
[rag]
chunk_size = 100
chunk_overlap = 150
"#;

    let errors = load_and_validate_str(toml).expect_err("overlap >= size should fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("chunk_overlap"))
    ));
}

/// load_and_validate_str accepts the defaults.
#[test]
fn validation_accepts_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.agent.name, "multisense");
}

/// Typo suggestion machinery works for our key space.
#[test]
fn suggestions_cover_rag_keys() {
    let valid = &[
        "chunk_size",
        "chunk_overlap",
        "top_k",
        "min_similarity",
        "max_context_chars",
    ];
    assert_eq!(
        suggest_key("min_similarty", valid),
        Some("min_similarity".to_string())
    );
}
