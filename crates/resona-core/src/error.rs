// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Resona reflection agent.

use thiserror::Error;

/// The primary error type used across all Resona crates.
#[derive(Debug, Error)]
pub enum ResonaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Model provider errors (API failure, rate limiting, unparseable responses).
    ///
    /// The `message` carries the remote error text verbatim -- the resilience
    /// layer classifies quota failures by scanning it for rate-limit markers.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced row (pattern, topic) does not exist for the given user.
    #[error("not found: {0}")]
    NotFound(String),

    /// HTTP gateway errors (bind failure, server error).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
