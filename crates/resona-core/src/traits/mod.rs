// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the seams between Resona components.
//!
//! Concrete implementations live in their own crates (`resona-gemini`,
//! `resona-storage`); mocks live in `resona-test-utils`.

pub mod model;
pub mod store;

pub use model::ModelClient;
pub use store::ReflectionStore;
