// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Resona reflection agent.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Resona workspace. The model client and
//! persistence implementations live in sibling crates and implement the
//! traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ResonaError;
pub use traits::{ModelClient, ReflectionStore};
pub use types::{
    GenerateRequest, GenerateResponse, HealthStatus, LearningTopic, MessageRecord, PatternKind,
    PatternRecord, PatternStatus, Role, TopicProgress, TopicWithPattern,
};
