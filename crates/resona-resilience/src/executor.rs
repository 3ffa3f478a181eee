// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry-with-rotation around one logical model call.
//!
//! Each attempt acquires a fresh key from the pool, invokes the client, and
//! reports the classified outcome back so the pool can track key health. The
//! executor never sleeps waiting for a cooling key -- it moves to the next
//! one, and recovery across calls happens via the pool's lazy cooldown expiry.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use resona_core::{GenerateRequest, ModelClient, ResonaError};

use crate::keypool::{CallOutcome, KeyPool, mask_secret};

/// Failure modes of a fully exhausted execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Every key in the pool is cooling down or disabled. A "try later"
    /// condition surfaced immediately -- the executor does not spin.
    #[error("no API key available (all keys cooling down or disabled)")]
    NoKeyAvailable,

    /// The service responded without usable text. Not retried: the request
    /// itself is the likely cause, not the key.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// All attempts failed with quota or transient errors.
    #[error("model call failed after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },
}

/// Executes one semantic model call with key rotation and bounded retries.
pub struct ResilientExecutor {
    pool: Arc<KeyPool>,
    client: Arc<dyn ModelClient>,
    max_attempts: u32,
}

impl ResilientExecutor {
    /// `max_attempts` comes from configuration (default 3).
    pub fn new(pool: Arc<KeyPool>, client: Arc<dyn ModelClient>, max_attempts: u32) -> Self {
        Self {
            pool,
            client,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Runs the request, rotating keys on classified failures.
    pub async fn execute(&self, request: &GenerateRequest) -> Result<String, ExecuteError> {
        for attempt in 1..=self.max_attempts {
            let Some(api_key) = self.pool.acquire() else {
                return Err(ExecuteError::NoKeyAvailable);
            };

            debug!(
                attempt,
                key = %mask_secret(&api_key),
                model = %request.model,
                "issuing model call"
            );

            match self.client.generate(&api_key, request).await {
                Ok(response) => match response.text {
                    Some(text) if !text.trim().is_empty() => {
                        self.pool.report(&api_key, CallOutcome::Success);
                        return Ok(text);
                    }
                    _ => {
                        self.pool.report(&api_key, CallOutcome::Malformed);
                        warn!(attempt, "model response carried no usable text");
                        return Err(ExecuteError::EmptyResponse);
                    }
                },
                Err(err) => {
                    if is_quota_error(&err) {
                        self.pool.report(&api_key, CallOutcome::QuotaExceeded);
                        warn!(
                            attempt,
                            key = %mask_secret(&api_key),
                            "quota exhausted, rotating to next key"
                        );
                    } else {
                        self.pool.report(&api_key, CallOutcome::TransientFailure);
                        error!(attempt, error = %err, "model call failed");
                    }
                }
            }
        }

        Err(ExecuteError::AttemptsExhausted {
            attempts: self.max_attempts,
        })
    }
}

/// Recognizes rate-limit failures by their remote error text.
fn is_quota_error(err: &ResonaError) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("429") || message.contains("resource_exhausted") || message.contains("quota")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use resona_test_utils::MockModelClient;

    fn request() -> GenerateRequest {
        GenerateRequest {
            model: "gemini-1.5-flash".into(),
            prompt: "hello".into(),
            temperature: 0.7,
            max_output_tokens: Some(800),
            expect_json: true,
        }
    }

    fn pool_with(keys: &[&str], cooldown: Duration) -> Arc<KeyPool> {
        Arc::new(KeyPool::new(
            keys.iter().map(|k| k.to_string()).collect(),
            cooldown,
        ))
    }

    #[tokio::test]
    async fn returns_text_on_first_success() {
        let client = Arc::new(MockModelClient::new());
        client.push_text("{\"reflection\": \"hi\"}").await;
        let pool = pool_with(&["key-a-00000001"], Duration::from_secs(300));
        let executor = ResilientExecutor::new(pool, client.clone(), 3);

        let text = executor.execute(&request()).await.unwrap();
        assert_eq!(text, "{\"reflection\": \"hi\"}");
        assert_eq!(client.call_count().await, 1);
    }

    #[tokio::test]
    async fn quota_failure_rotates_to_next_key() {
        let client = Arc::new(MockModelClient::new());
        client.push_error("API returned 429: RESOURCE_EXHAUSTED").await;
        client.push_text("recovered").await;
        let pool = pool_with(&["key-a-00000001", "key-b-00000001"], Duration::from_secs(300));
        let executor = ResilientExecutor::new(pool.clone(), client.clone(), 3);

        let text = executor.execute(&request()).await.unwrap();
        assert_eq!(text, "recovered");
        assert_eq!(client.keys_used().await, vec!["key-a-00000001", "key-b-00000001"]);

        // The failed key is in cooldown; only the second key stays in rotation.
        assert_eq!(pool.acquire().as_deref(), Some("key-b-00000001"));
        assert_eq!(pool.acquire().as_deref(), Some("key-b-00000001"));
    }

    #[tokio::test]
    async fn transient_failure_also_rotates() {
        let client = Arc::new(MockModelClient::new());
        client.push_error("connection reset by peer").await;
        client.push_text("ok").await;
        let pool = pool_with(&["key-a-00000001", "key-b-00000001"], Duration::from_secs(300));
        let executor = ResilientExecutor::new(pool, client.clone(), 3);

        assert_eq!(executor.execute(&request()).await.unwrap(), "ok");
        assert_eq!(client.call_count().await, 2);
    }

    #[tokio::test]
    async fn drained_pool_fails_fast_without_calling() {
        let client = Arc::new(MockModelClient::new());
        let pool = pool_with(&["key-a-00000001"], Duration::from_secs(300));
        pool.report("key-a-00000001", CallOutcome::QuotaExceeded);
        let executor = ResilientExecutor::new(pool, client.clone(), 3);

        let err = executor.execute(&request()).await.unwrap_err();
        assert!(matches!(err, ExecuteError::NoKeyAvailable));
        assert_eq!(client.call_count().await, 0);
    }

    #[tokio::test]
    async fn attempts_exhaust_after_max_failures() {
        let client = Arc::new(MockModelClient::new());
        for _ in 0..3 {
            client.push_error("quota exceeded for project").await;
        }
        // Zero cooldown keeps the single key eligible for every attempt.
        let pool = pool_with(&["key-a-00000001"], Duration::ZERO);
        let executor = ResilientExecutor::new(pool, client.clone(), 3);

        let err = executor.execute(&request()).await.unwrap_err();
        assert!(matches!(err, ExecuteError::AttemptsExhausted { attempts: 3 }));
        assert_eq!(client.call_count().await, 3);
    }

    #[tokio::test]
    async fn empty_response_is_not_retried() {
        let client = Arc::new(MockModelClient::new());
        client.push_empty().await;
        client.push_text("never reached").await;
        let pool = pool_with(&["key-a-00000001", "key-b-00000001"], Duration::from_secs(300));
        let executor = ResilientExecutor::new(pool.clone(), client.clone(), 3);

        let err = executor.execute(&request()).await.unwrap_err();
        assert!(matches!(err, ExecuteError::EmptyResponse));
        assert_eq!(client.call_count().await, 1);
        // Malformed says nothing about key health.
        assert_eq!(pool.acquire().as_deref(), Some("key-b-00000001"));
    }

    #[test]
    fn quota_markers_are_case_insensitive() {
        let quota = ResonaError::Provider {
            message: "RESOURCE_EXHAUSTED: Quota exceeded".into(),
            source: None,
        };
        assert!(is_quota_error(&quota));

        let transient = ResonaError::Provider {
            message: "connection timed out".into(),
            source: None,
        };
        assert!(!is_quota_error(&transient));
    }
}
