// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hugging Face Inference API gateways for MultiSense.
//!
//! One HTTP client implements all four gateway contracts against the
//! serverless Inference API: chat completion (generation), feature
//! extraction (embeddings), automatic speech recognition (transcription),
//! and image-to-text (captioning).
//!
//! Retry policy for transient upstream errors lives here, in the gateway
//! collaborator -- the core never retries.

pub mod client;
pub mod types;

pub use client::HfClient;
