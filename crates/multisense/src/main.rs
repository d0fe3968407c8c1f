// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MultiSense - a multi-modal RAG assistant backend.
//!
//! This is the binary entry point for the MultiSense CLI.

use clap::{Parser, Subcommand};

mod app;
mod ingest;
mod shell;

/// MultiSense - a multi-modal RAG assistant.
#[derive(Parser, Debug)]
#[command(name = "multisense", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session.
    Shell,
    /// Ingest a text file into the knowledge base.
    Ingest {
        /// Path to the file to ingest.
        path: String,
        /// Document id; defaults to the file stem.
        #[arg(long)]
        document_id: Option<String>,
    },
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match multisense_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            multisense_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Shell) => shell::run_shell(config).await,
        Some(Commands::Ingest { path, document_id }) => {
            ingest::run_ingest(config, &path, document_id.as_deref()).await
        }
        Some(Commands::Config) => {
            print_config_summary(&config);
            Ok(())
        }
        None => {
            println!("multisense: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber from config, honoring `RUST_LOG`.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print a redacted summary of the resolved configuration.
fn print_config_summary(config: &multisense_config::MultisenseConfig) {
    println!("agent.name           = {}", config.agent.name);
    println!("agent.log_level      = {}", config.agent.log_level);
    println!(
        "huggingface.api_token = {}",
        if config.huggingface.api_token.is_empty() {
            "(unset)"
        } else {
            "(set)"
        }
    );
    println!("huggingface.chat_model      = {}", config.huggingface.chat_model);
    println!("huggingface.embedding_model = {}", config.huggingface.embedding_model);
    println!("huggingface.whisper_model   = {}", config.huggingface.whisper_model);
    println!("huggingface.vision_model    = {}", config.huggingface.vision_model);
    println!("rag.chunk_size       = {}", config.rag.chunk_size);
    println!("rag.chunk_overlap    = {}", config.rag.chunk_overlap);
    println!("rag.top_k            = {}", config.rag.top_k);
    println!("rag.min_similarity   = {}", config.rag.min_similarity);
    println!("memory.max_turns     = {}", config.memory.max_turns);
    println!("memory.ttl_secs      = {}", config.memory.ttl_secs);
    println!("storage.database_path = {}", config.storage.database_path);
}
