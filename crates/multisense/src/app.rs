// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring: build a fully-connected orchestrator from configuration.

use std::sync::Arc;

use multisense_agent::Orchestrator;
use multisense_config::model::{AgentConfig, MultisenseConfig};
use multisense_core::error::MultisenseError;
use multisense_core::traits::{
    CaptioningGateway, GenerationGateway, TranscriptionGateway,
};
use multisense_hf::HfClient;
use multisense_memory::ConversationMemory;
use multisense_rag::RagEngine;
use multisense_storage::SqliteVectorIndex;
use tracing::info;

/// Build the orchestrator with Hugging Face gateways and the SQLite chunk
/// store from configuration.
pub async fn wire(config: &MultisenseConfig) -> Result<Orchestrator, MultisenseError> {
    let hf = Arc::new(HfClient::new(&config.huggingface)?);
    let index = Arc::new(SqliteVectorIndex::open(&config.storage.database_path).await?);
    info!(
        database_path = %config.storage.database_path,
        "chunk store opened"
    );

    let rag = Arc::new(RagEngine::new(
        hf.clone(),
        index,
        config.rag.clone(),
    ));
    let memory = Arc::new(ConversationMemory::from_config(&config.memory));
    let system_prompt = resolve_system_prompt(&config.agent)?;

    Ok(Orchestrator::new(
        hf.clone() as Arc<dyn GenerationGateway>,
        hf.clone() as Arc<dyn TranscriptionGateway>,
        hf as Arc<dyn CaptioningGateway>,
        rag,
        memory,
        system_prompt,
    ))
}

/// Resolve the system prompt: a file path takes precedence over the inline
/// string; `None` falls back to the built-in default downstream.
fn resolve_system_prompt(agent: &AgentConfig) -> Result<Option<String>, MultisenseError> {
    if let Some(path) = &agent.system_prompt_file {
        let prompt = std::fs::read_to_string(path).map_err(|e| {
            MultisenseError::Config(format!("failed to read system_prompt_file `{path}`: {e}"))
        })?;
        return Ok(Some(prompt));
    }
    Ok(agent.system_prompt.clone())
}
