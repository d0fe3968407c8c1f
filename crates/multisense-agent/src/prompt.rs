// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded prompt assembly: history + retrieved context + current input.

use multisense_core::types::{
    ChatMessage, ConversationTurn, GenerationRequest, RetrievalResult,
};

/// Default system prompt, used when configuration provides none.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are MultiSense, an intelligent multi-modal assistant. You can answer \
questions from your knowledge, describe images, respond to transcribed voice \
messages, and answer questions about documents the user has shared using \
retrieved context.

Guidelines:
- Be helpful, accurate, and concise
- When answering from document context, cite the source
- If you don't know something, say so honestly
- Keep responses compact enough for a messaging app";

/// Separator between retrieved chunks inside the context block.
const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Join retrieved chunk texts into a bounded context block.
///
/// Whole chunks are appended (highest-ranked first) while the block stays
/// within `max_chars` characters; later chunks that would overflow are
/// dropped. If even the first chunk exceeds the budget it is truncated at a
/// char boundary, so the block is never empty when results exist.
pub fn context_block(results: &[RetrievalResult], max_chars: usize) -> String {
    let mut block = String::new();

    for result in results {
        let text = result.text.as_str();
        if block.is_empty() {
            if text.chars().count() > max_chars {
                block.extend(text.chars().take(max_chars));
            } else {
                block.push_str(text);
            }
            continue;
        }

        let projected =
            block.chars().count() + CHUNK_SEPARATOR.chars().count() + text.chars().count();
        if projected > max_chars {
            break;
        }
        block.push_str(CHUNK_SEPARATOR);
        block.push_str(text);
    }

    block
}

/// Wrap the user's input with the retrieved context block.
pub fn augment_input(input: &str, context: &str) -> String {
    format!(
        "Use the following context to answer the user's question. \
         If the context is not relevant, answer from your general knowledge.\n\n\
         --- Retrieved Context ---\n{context}\n--- End Context ---\n\n\
         User Question: {input}"
    )
}

/// Assemble the full generation request.
///
/// Prior turns come first, oldest to newest, followed by the current input as
/// the final user message -- augmented with retrieved context when any
/// retrieval results are present.
pub fn build_request(
    system_prompt: Option<&str>,
    history: &[ConversationTurn],
    retrieved: &[RetrievalResult],
    input: &str,
    max_context_chars: usize,
) -> GenerationRequest {
    let mut messages: Vec<ChatMessage> = history
        .iter()
        .map(|turn| ChatMessage {
            role: turn.role,
            content: turn.text.clone(),
        })
        .collect();

    let final_input = if retrieved.is_empty() {
        input.to_string()
    } else {
        let context = context_block(retrieved, max_context_chars);
        augment_input(input, &context)
    };

    messages.push(ChatMessage {
        role: multisense_core::types::Role::User,
        content: final_input,
    });

    GenerationRequest {
        system_prompt: Some(
            system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT).to_string(),
        ),
        messages,
    }
}
