// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for MultiSense.
//!
//! Mock gateway adapters with deterministic behavior, an in-memory vector
//! index, and a [`TestHarness`] that wires a complete pipeline (mock gateways,
//! temp SQLite chunk store, conversation memory, orchestrator) for fast,
//! CI-runnable end-to-end tests without external API calls.

pub mod harness;
pub mod memory_index;
pub mod mock_gateways;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_index::InMemoryVectorIndex;
pub use mock_gateways::{
    hash_embedding, MockCaptioner, MockEmbedder, MockGenerator, MockTranscriber,
    MOCK_EMBEDDING_DIMS,
};
