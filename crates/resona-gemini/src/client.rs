// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.
//!
//! One client instance (with its connection pool) serves the whole key pool;
//! the API key arrives per call via the `x-goog-api-key` header. Retry and
//! rotation live in `resona-resilience` -- this layer does a single request
//! and reports what happened, with the remote error text preserved verbatim
//! so the executor can classify quota failures.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use resona_core::{GenerateRequest, GenerateResponse, ModelClient, ResonaError};

use crate::types::{
    ApiErrorResponse, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part,
};

/// Base URL for the Gemini REST API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Safety net at the transport layer only; attempt semantics are unchanged.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new() -> Result<Self, ResonaError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ResonaError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ResonaError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: request
                    .expect_json
                    .then(|| "application/json".to_string()),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ResonaError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "generateContent response received");

        if status.is_success() {
            let body = response.text().await.map_err(|e| ResonaError::Provider {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })?;
            let parsed: GenerateContentResponse =
                serde_json::from_str(&body).map_err(|e| ResonaError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                })?;
            return Ok(GenerateResponse {
                text: parsed.first_candidate_text(),
            });
        }

        // Keep the numeric status and the API's symbolic status in the message;
        // the executor classifies quota failures by scanning it.
        let body = response.text().await.unwrap_or_default();
        let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
            format!(
                "Gemini API error ({} {}): {}",
                status.as_u16(),
                api_err.error.status,
                api_err.error.message
            )
        } else {
            format!("API returned {status}: {body}")
        };
        Err(ResonaError::Provider {
            message,
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new().unwrap().with_base_url(base_url.to_string())
    }

    fn test_request() -> GenerateRequest {
        GenerateRequest {
            model: "gemini-1.5-flash".into(),
            prompt: "How are you feeling?".into(),
            temperature: 0.7,
            max_output_tokens: Some(800),
            expect_json: true,
        }
    }

    #[tokio::test]
    async fn generate_returns_candidate_text() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"reflection\": \"I hear you\"}"}], "role": "model"}}
            ]
        });

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.generate("test-api-key", &test_request()).await.unwrap();
        assert_eq!(
            result.text.as_deref(),
            Some("{\"reflection\": \"I hear you\"}")
        );
    }

    #[tokio::test]
    async fn empty_candidates_yield_none_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.generate("test-api-key", &test_request()).await.unwrap();
        assert!(result.text.is_none());
    }

    #[tokio::test]
    async fn quota_error_message_carries_classification_markers() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {
                "code": 429,
                "message": "Quota exceeded for quota metric",
                "status": "RESOURCE_EXHAUSTED"
            }
        });

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate("test-api-key", &test_request())
            .await
            .unwrap_err();
        let message = err.to_string().to_lowercase();
        assert!(message.contains("429"), "got: {message}");
        assert!(message.contains("resource_exhausted"), "got: {message}");
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back_to_raw_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate("test-api-key", &test_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn request_body_includes_generation_config() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
        });

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "generationConfig": {
                    "temperature": 0.7,
                    "maxOutputTokens": 800,
                    "responseMimeType": "application/json"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.generate("test-api-key", &test_request()).await;
        assert!(result.is_ok(), "generation config should match: {result:?}");
    }
}
