// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `multisense ingest` command implementation.

use std::collections::HashMap;
use std::path::Path;

use colored::Colorize;
use multisense_config::MultisenseConfig;
use multisense_core::error::MultisenseError;

use crate::app;

/// Ingest a text file into the knowledge base and print the report.
pub async fn run_ingest(
    config: MultisenseConfig,
    path: &str,
    document_id: Option<&str>,
) -> Result<(), MultisenseError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MultisenseError::InvalidInput(format!("cannot read `{path}`: {e}")))?;

    let document_id = match document_id {
        Some(id) => id.to_string(),
        None => Path::new(path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string()),
    };

    let orchestrator = app::wire(&config).await?;
    let mut metadata = HashMap::new();
    metadata.insert("source_path".to_string(), path.to_string());

    match orchestrator
        .ingest_document(&document_id, &text, &metadata)
        .await
    {
        Ok(report) => {
            println!(
                "{} ingested `{}` as {} chunks",
                "ok:".green().bold(),
                report.document_id,
                report.chunks_created
            );
            Ok(())
        }
        Err(MultisenseError::PartialIngestion {
            document_id,
            failed_chunks,
            stored_chunks,
        }) => {
            eprintln!(
                "{} `{document_id}`: {stored_chunks} chunks stored, {} failed (indices {:?})",
                "partial:".yellow().bold(),
                failed_chunks.len(),
                failed_chunks
            );
            eprintln!("re-run the same command to retry; stored chunks are overwritten in place");
            Err(MultisenseError::PartialIngestion {
                document_id,
                failed_chunks,
                stored_chunks,
            })
        }
        Err(e) => Err(e),
    }
}
