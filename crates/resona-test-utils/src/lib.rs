// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Resona integration tests.
//!
//! Provides a scripted [`MockModelClient`] and an in-memory [`MockStore`],
//! enabling fast, CI-runnable tests without external API calls or disk.

pub mod mock_model;
pub mod mock_store;

pub use mock_model::MockModelClient;
pub use mock_store::MockStore;
