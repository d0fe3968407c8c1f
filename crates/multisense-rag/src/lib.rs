// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval-augmented generation engine for MultiSense.
//!
//! Splits ingested documents into overlapping chunks, embeds them through the
//! embedding gateway, stores them in a vector index, and turns query text into
//! a ranked, threshold-filtered set of retrieval results.

pub mod chunker;
pub mod engine;

pub use chunker::split_text;
pub use engine::{chunk_id, RagEngine};
