// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core trait definitions, error types, and domain types for MultiSense.
//!
//! Everything the pipeline crates share lives here: the closed message-kind
//! model, the chunk/retrieval/turn data model, the gateway contracts for
//! external AI services, and the vector-index contract for chunk storage.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MultisenseError;
pub use traits::{
    CaptioningGateway, EmbeddingGateway, GenerationGateway, TranscriptionGateway, VectorIndex,
};
