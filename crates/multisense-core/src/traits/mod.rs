// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contracts for external collaborators.
//!
//! The core depends only on these narrow input/output signatures -- transport,
//! credentials, and retry policy live behind them in the implementing crates.

pub mod gateway;
pub mod index;

pub use gateway::{
    CaptioningGateway, EmbeddingGateway, GenerationGateway, TranscriptionGateway,
};
pub use index::VectorIndex;
