// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as chunk-overlap bounds and similarity ranges.

use crate::diagnostic::ConfigError;
use crate::model::MultisenseConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MultisenseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join("/"),
                config.agent.log_level
            ),
        });
    }

    if config.rag.chunk_size == 0 {
        errors.push(ConfigError::Validation {
            message: "rag.chunk_size must be at least 1".to_string(),
        });
    }

    // An overlap >= chunk size would make the splitter's stride non-positive.
    if config.rag.chunk_overlap >= config.rag.chunk_size && config.rag.chunk_size > 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                config.rag.chunk_overlap, config.rag.chunk_size
            ),
        });
    }

    if config.rag.top_k == 0 {
        errors.push(ConfigError::Validation {
            message: "rag.top_k must be at least 1".to_string(),
        });
    }

    if !(-1.0..=1.0).contains(&config.rag.min_similarity) {
        errors.push(ConfigError::Validation {
            message: format!(
                "rag.min_similarity must be within [-1.0, 1.0], got {}",
                config.rag.min_similarity
            ),
        });
    }

    if config.memory.max_turns == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.max_turns must be at least 1".to_string(),
        });
    }

    if config.memory.ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.ttl_secs must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = MultisenseConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn overlap_not_smaller_than_chunk_size_fails() {
        let mut config = MultisenseConfig::default();
        config.rag.chunk_size = 100;
        config.rag.chunk_overlap = 100;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("chunk_overlap"))));
    }

    #[test]
    fn zero_chunk_size_fails() {
        let mut config = MultisenseConfig::default();
        config.rag.chunk_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("chunk_size"))));
    }

    #[test]
    fn zero_top_k_fails() {
        let mut config = MultisenseConfig::default();
        config.rag.top_k = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("top_k"))));
    }

    #[test]
    fn similarity_out_of_range_fails() {
        let mut config = MultisenseConfig::default();
        config.rag.min_similarity = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("min_similarity"))));
    }

    #[test]
    fn zero_max_turns_fails() {
        let mut config = MultisenseConfig::default();
        config.memory.max_turns = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_turns"))));
    }

    #[test]
    fn empty_database_path_fails() {
        let mut config = MultisenseConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn bad_log_level_fails() {
        let mut config = MultisenseConfig::default();
        config.agent.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn multiple_errors_collected() {
        let mut config = MultisenseConfig::default();
        config.rag.top_k = 0;
        config.memory.max_turns = 0;
        config.storage.database_path = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
