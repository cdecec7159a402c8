use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use super::errors::{is_transient_transport, HttpError};
use super::retry::RetryPolicy;
use crate::domain::models::{InferenceConfig, RetryConfig};

/// Status and body of a response the client did not retry.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// HTTP client posting JSON to a single inference endpoint
///
/// Features:
/// - Connection pooling and reuse (via `reqwest::Client`)
/// - Bearer authentication through default headers
/// - Exponential backoff retry for retryable statuses and transport errors
/// - Non-retryable statuses are handed back to the caller untouched
#[derive(Debug, Clone)]
pub struct RetryingHttpClient {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,

    /// Endpoint every request is posted to
    endpoint: String,

    /// Retry policy for transient failures
    retry_policy: RetryPolicy,
}

impl RetryingHttpClient {
    /// Create a client for `endpoint` authenticating with `token`
    pub fn new(
        endpoint: impl Into<String>,
        token: &str,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, HttpError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| HttpError::InvalidHeader("bearer token".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .timeout(timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            retry_policy,
        })
    }

    /// Create a client from the inference and retry configuration sections
    pub fn from_config(inference: &InferenceConfig, retry: &RetryConfig) -> Result<Self, HttpError> {
        Self::new(
            inference.url.clone(),
            &inference.token,
            Duration::from_secs(inference.timeout_secs),
            RetryPolicy::from_config(retry),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// POST `body` as JSON, retrying transient failures
    ///
    /// # Returns
    /// * `Ok(HttpResponse)` - Any response whose status is not retryable,
    ///   success or not
    /// * `Err(HttpError)` - Retries exhausted, or a non-transient failure
    #[instrument(skip(self, body), fields(endpoint = %self.endpoint))]
    pub async fn post_json<B>(&self, body: &B) -> Result<HttpResponse, HttpError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut retries = 0_u32;

        loop {
            let attempt = retries + 1;
            match self.http_client.post(&self.endpoint).json(body).send().await {
                Ok(response) => {
                    let status = response.status();

                    if self.retry_policy.should_retry_status(status) {
                        if retries < self.retry_policy.total_retries() {
                            retries += 1;
                            let delay = self.retry_policy.delay_for(retries, response.headers());
                            warn!(
                                status = status.as_u16(),
                                attempt,
                                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                                "retryable status from inference endpoint"
                            );
                            sleep(delay).await;
                            continue;
                        }

                        let body = response.text().await.unwrap_or_default();
                        warn!(status = status.as_u16(), attempts = attempt, "retries exhausted");
                        return Err(HttpError::RetriesExhausted {
                            status,
                            attempts: attempt,
                            body,
                        });
                    }

                    let body = response.text().await?;
                    if retries > 0 {
                        debug!(attempts = attempt, "request succeeded after retries");
                    }
                    return Ok(HttpResponse { status, body });
                }
                Err(err) if is_transient_transport(&err) => {
                    if retries < self.retry_policy.total_retries() {
                        retries += 1;
                        let delay = self.retry_policy.backoff(retries);
                        warn!(
                            error = %err,
                            attempt,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "transport error from inference endpoint"
                        );
                        sleep(delay).await;
                        continue;
                    }

                    return Err(if err.is_timeout() {
                        HttpError::Timeout { attempts: attempt }
                    } else {
                        HttpError::Connection {
                            attempts: attempt,
                            message: err.to_string(),
                        }
                    });
                }
                Err(err) => return Err(HttpError::Request(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_token_with_newline() {
        let result = RetryingHttpClient::new(
            "http://localhost:1/embed",
            "bad\ntoken",
            Duration::from_secs(1),
            RetryPolicy::default(),
        );
        assert!(matches!(result, Err(HttpError::InvalidHeader(_))));
    }

    #[test]
    fn test_from_config() {
        let inference = InferenceConfig {
            url: "http://localhost:8080/embed".to_string(),
            token: "hf_test".to_string(),
            dimensions: 384,
            max_tokens_per_item: 512,
            timeout_secs: 5,
        };
        let client = RetryingHttpClient::from_config(&inference, &RetryConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/embed");
        assert_eq!(client.retry_policy().max_attempts(), 6);
    }

    #[test]
    fn test_response_json() {
        let response = HttpResponse {
            status: StatusCode::OK,
            body: "[[0.5, 1.0]]".to_string(),
        };
        assert!(response.is_success());
        let vectors: Vec<Vec<f32>> = response.json().unwrap();
        assert_eq!(vectors, vec![vec![0.5, 1.0]]);
    }
}
