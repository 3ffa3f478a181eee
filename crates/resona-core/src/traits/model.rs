// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model client trait for the remote generation service.

use async_trait::async_trait;

use crate::error::ResonaError;
use crate::types::{GenerateRequest, GenerateResponse};

/// A client for one remote text-generation service.
///
/// The API key is supplied per call rather than held by the client: credential
/// selection and health tracking happen in the resilience layer above, and a
/// single client instance (with its connection pool) serves the whole pool
/// of keys.
#[async_trait]
pub trait ModelClient: Send + Sync + 'static {
    /// Issues one generation call with the given credential.
    ///
    /// Returns `Ok` with `text: None` when the service responded but produced
    /// no usable text. Errors carry the remote message verbatim so the caller
    /// can classify quota failures.
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ResonaError>;
}
