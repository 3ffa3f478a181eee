// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock model client with scripted outcomes for deterministic testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use resona_core::{GenerateRequest, GenerateResponse, ModelClient, ResonaError};

/// A mock model client that pops pre-scripted outcomes from a FIFO queue.
///
/// Every call records the API key and the full request it was invoked with,
/// so tests can assert on key rotation and on what the prompts carried. When
/// the script is empty, a default "mock response" text is returned.
pub struct MockModelClient {
    script: Mutex<VecDeque<Result<GenerateResponse, ResonaError>>>,
    calls: Mutex<Vec<String>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockModelClient {
    /// Creates a mock client with an empty script.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful response with the given text.
    pub async fn push_text(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(Ok(GenerateResponse {
            text: Some(text.into()),
        }));
    }

    /// Queues a response that arrived without usable text.
    pub async fn push_empty(&self) {
        self.script
            .lock()
            .await
            .push_back(Ok(GenerateResponse { text: None }));
    }

    /// Queues a provider error with the given message.
    ///
    /// Pass a message containing `429`, `RESOURCE_EXHAUSTED`, or `quota` to
    /// simulate a rate-limit failure.
    pub async fn push_error(&self, message: impl Into<String>) {
        self.script.lock().await.push_back(Err(ResonaError::Provider {
            message: message.into(),
            source: None,
        }));
    }

    /// Returns the API keys used so far, in call order.
    pub async fn keys_used(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// Returns the number of calls made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Returns the requests seen so far, in call order.
    pub async fn requests_seen(&self) -> Vec<GenerateRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ResonaError> {
        self.calls.lock().await.push(api_key.to_string());
        self.requests.lock().await.push(request.clone());
        self.script.lock().await.pop_front().unwrap_or(Ok(GenerateResponse {
            text: Some("mock response".to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerateRequest {
        GenerateRequest {
            model: "test-model".into(),
            prompt: "hello".into(),
            temperature: 0.7,
            max_output_tokens: None,
            expect_json: false,
        }
    }

    #[tokio::test]
    async fn default_response_when_script_empty() {
        let client = MockModelClient::new();
        let resp = client.generate("key-1", &request()).await.unwrap();
        assert_eq!(resp.text.as_deref(), Some("mock response"));
    }

    #[tokio::test]
    async fn scripted_outcomes_pop_in_order() {
        let client = MockModelClient::new();
        client.push_error("API returned 429: quota").await;
        client.push_text("after retry").await;

        assert!(client.generate("k1", &request()).await.is_err());
        let resp = client.generate("k2", &request()).await.unwrap();
        assert_eq!(resp.text.as_deref(), Some("after retry"));
        assert_eq!(client.keys_used().await, vec!["k1", "k2"]);
    }

    #[tokio::test]
    async fn empty_outcome_has_no_text() {
        let client = MockModelClient::new();
        client.push_empty().await;
        let resp = client.generate("k", &request()).await.unwrap();
        assert!(resp.text.is_none());
    }
}
