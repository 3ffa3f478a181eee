// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini model client.
//!
//! Implements [`resona_core::ModelClient`] over the `generateContent` REST
//! endpoint. Credential rotation lives above this crate -- the API key is
//! passed per call.

pub mod client;
pub mod types;

pub use client::GeminiClient;
