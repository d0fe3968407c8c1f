// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./multisense.toml` > `~/.config/multisense/multisense.toml`
//! > `/etc/multisense/multisense.toml` with environment variable overrides via
//! `MULTISENSE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MultisenseConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/multisense/multisense.toml` (system-wide)
/// 3. `~/.config/multisense/multisense.toml` (user XDG config)
/// 4. `./multisense.toml` (local directory)
/// 5. `MULTISENSE_*` environment variables
pub fn load_config() -> Result<MultisenseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MultisenseConfig::default()))
        .merge(Toml::file("/etc/multisense/multisense.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("multisense/multisense.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("multisense.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<MultisenseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MultisenseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MultisenseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MultisenseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MULTISENSE_RAG_CHUNK_SIZE` must map to
/// `rag.chunk_size`, not `rag.chunk.size`.
fn env_provider() -> Env {
    Env::prefixed("MULTISENSE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: MULTISENSE_HUGGINGFACE_API_TOKEN -> "huggingface_api_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("huggingface_", "huggingface.", 1)
            .replacen("rag_", "rag.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
