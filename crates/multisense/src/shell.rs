// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `multisense shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Creates a new session per invocation; slash commands manage the knowledge
//! base and conversation memory. This is boundary-layer code: the only place
//! user-facing text is formatted.

use std::collections::HashMap;

use chrono::Utc;
use colored::Colorize;
use multisense_agent::{HandleOptions, Orchestrator};
use multisense_config::MultisenseConfig;
use multisense_core::error::MultisenseError;
use multisense_core::types::{InboundMessage, MessagePayload, OrchestratorResult};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

/// Runs the interactive REPL.
pub async fn run_shell(config: MultisenseConfig) -> Result<(), MultisenseError> {
    let orchestrator = app_wire_with_hint(&config).await?;
    let session_id = format!("shell-{}", uuid::Uuid::new_v4());

    println!(
        "{} {}",
        "MultiSense shell".bold(),
        "-- type a message, or /help for commands".dimmed()
    );

    let mut editor = DefaultEditor::new()
        .map_err(|e| MultisenseError::Internal(format!("readline init failed: {e}")))?;
    let prompt = format!("{} ", "you>".cyan().bold());

    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                if let Some(command) = line.strip_prefix('/') {
                    if !handle_command(&orchestrator, &session_id, command).await {
                        break;
                    }
                    continue;
                }

                send_text(&orchestrator, &session_id, line).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("bye");
                break;
            }
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    Ok(())
}

async fn app_wire_with_hint(config: &MultisenseConfig) -> Result<Orchestrator, MultisenseError> {
    if config.huggingface.api_token.is_empty() {
        eprintln!(
            "{} no Hugging Face API token configured; requests may be rate-limited. \
             Set MULTISENSE_HUGGINGFACE_API_TOKEN or huggingface.api_token in multisense.toml",
            "note:".yellow()
        );
    }
    crate::app::wire(config).await
}

/// Send a text message and print the reply. Errors are shown, not fatal.
async fn send_text(orchestrator: &Orchestrator, session_id: &str, text: &str) {
    let message = InboundMessage {
        id: uuid::Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        payload: MessagePayload::Text {
            text: text.to_string(),
        },
        received_at: Utc::now(),
    };

    match orchestrator.handle(message, HandleOptions::default()).await {
        Ok(OrchestratorResult::Reply(reply)) => {
            println!("{} {}", "multisense>".green().bold(), reply.reply_text);
            if !reply.sources.is_empty() {
                println!(
                    "{}",
                    format!("  sources: {}", reply.sources.join(", ")).dimmed()
                );
            }
            debug!(
                elapsed_ms = reply.processing_time.as_millis() as u64,
                "reply rendered"
            );
        }
        Ok(OrchestratorResult::Ingestion(report)) => {
            // Text messages never take the ingestion path; kept for match
            // exhaustiveness.
            println!(
                "ingested {} ({} chunks)",
                report.document_id, report.chunks_created
            );
        }
        Err(e) => eprintln!("{} {e}", "error:".red().bold()),
    }
}

/// Handle a slash command. Returns `false` to exit the REPL.
async fn handle_command(orchestrator: &Orchestrator, session_id: &str, command: &str) -> bool {
    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => return false,
        "help" => {
            println!("  /ingest <path>   ingest a text file into the knowledge base");
            println!("  /forget <id>     remove an ingested document");
            println!("  /history         show this session's conversation turns");
            println!("  /clear           clear this session's history");
            println!("  /sessions        list active sessions");
            println!("  /quit            exit the shell");
        }
        "ingest" => {
            if arg.is_empty() {
                eprintln!("usage: /ingest <path>");
                return true;
            }
            ingest_file(orchestrator, arg).await;
        }
        "forget" => {
            if arg.is_empty() {
                eprintln!("usage: /forget <document-id>");
                return true;
            }
            match orchestrator.forget_document(arg).await {
                Ok(removed) => println!("removed `{arg}` ({removed} chunks)"),
                Err(e) => eprintln!("{} {e}", "error:".red().bold()),
            }
        }
        "history" => {
            let turns = orchestrator.history(session_id);
            if turns.is_empty() {
                println!("(no history)");
            }
            for turn in turns {
                println!(
                    "{} {}",
                    format!("[{}]", turn.role).dimmed(),
                    turn.text
                );
            }
        }
        "clear" => {
            orchestrator.clear_session(session_id);
            println!("history cleared");
        }
        "sessions" => {
            for id in orchestrator.active_sessions() {
                println!("{id}");
            }
        }
        other => eprintln!("unknown command `/{other}` -- /help lists commands"),
    }

    true
}

async fn ingest_file(orchestrator: &Orchestrator, path: &str) {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{} cannot read `{path}`: {e}", "error:".red().bold());
            return;
        }
    };

    let document_id = std::path::Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());

    let mut metadata = HashMap::new();
    metadata.insert("source_path".to_string(), path.to_string());

    match orchestrator
        .ingest_document(&document_id, &text, &metadata)
        .await
    {
        Ok(report) => println!(
            "ingested `{}` as {} chunks -- ask away",
            report.document_id, report.chunks_created
        ),
        Err(e) => eprintln!("{} {e}", "error:".red().bold()),
    }
}
