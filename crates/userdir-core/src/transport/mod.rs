//! HTTP access layer
//!
//! `Transport` sends JSON requests through an `HttpHandler`, applying a
//! per-attempt timeout and a bounded linear-backoff retry. Once retries are
//! exhausted the last failure is classified into an `ApiError`.
//!
//! - `error`: attempt and API error types
//! - `retry`: the retry combinator
//! - `http`: reqwest-backed handler used in production
//! - `mock`: scripted and in-memory handlers for tests and offline use

pub mod error;
pub mod http;
pub mod mock;
pub mod retry;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

pub use error::{ApiError, ApiResult, AttemptError, ErrorKind};
pub use http::ReqwestHandler;
pub use retry::{retry, RetryOutcome, RetryPolicy};

use crate::config::ApiConfig;

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the API base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Performs exactly one HTTP attempt
///
/// Implementations must report non-2xx responses as `AttemptError::Status`
/// and always send a JSON content type.
#[async_trait]
pub trait HttpHandler: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<Value, AttemptError>;
}

/// Why a single attempt failed, including timeouts
#[derive(Debug)]
enum AttemptFailure {
    TimedOut,
    Failed(AttemptError),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::TimedOut => f.write_str("timed out"),
            AttemptFailure::Failed(e) => e.fmt(f),
        }
    }
}

/// Retrying JSON transport
#[derive(Clone)]
pub struct Transport {
    handler: Arc<dyn HttpHandler>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Transport {
    /// Create a transport with the default timeout and retry policy
    pub fn new(handler: Arc<dyn HttpHandler>) -> Self {
        Self {
            handler,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Build the production transport from configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let handler = ReqwestHandler::new(&config.base_url)
            .with_context(|| format!("Failed to build HTTP client for {}", config.base_url))?;
        Ok(Self::new(Arc::new(handler))
            .with_timeout(config.timeout())
            .with_retry(config.retry_policy()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Send a request, retrying failed attempts
    ///
    /// A timed-out attempt aborts the request without further retries.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            body,
        };

        let request = &request;
        let outcome = retry(
            &self.retry,
            move |attempt| async move {
                debug!(method = %request.method, path = %request.path, attempt, "Sending request");
                match tokio::time::timeout(self.timeout, self.handler.send(request)).await {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(e)) => Err(AttemptFailure::Failed(e)),
                    Err(_) => Err(AttemptFailure::TimedOut),
                }
            },
            |failure| matches!(failure, AttemptFailure::TimedOut),
        )
        .await;

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                debug!(method = %method, path = %path, attempts, "Request succeeded");
                Ok(value)
            }
            RetryOutcome::Aborted { attempts, .. } => {
                warn!(
                    method = %method,
                    path = %path,
                    attempts,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Request timed out"
                );
                Err(ApiError::Timeout {
                    after: self.timeout,
                })
            }
            RetryOutcome::Exhausted { error, attempts } => {
                let err = match error {
                    AttemptFailure::Failed(e) => ApiError::classify(e),
                    AttemptFailure::TimedOut => ApiError::Timeout {
                        after: self.timeout,
                    },
                };
                warn!(method = %method, path = %path, attempts, error = %err, "Request failed");
                Err(err)
            }
        }
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.request(Method::Post, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.request(Method::Put, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::Delete, path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{ScriptedHandler, Step};
    use super::*;
    use serde_json::json;

    fn transport(handler: Arc<ScriptedHandler>, attempts: u32) -> Transport {
        Transport::new(handler)
            .with_timeout(Duration::from_millis(200))
            .with_retry(RetryPolicy::linear(attempts, Duration::from_millis(1)))
    }

    fn status(code: u16) -> AttemptError {
        AttemptError::Status {
            status: code,
            reason: "test".into(),
        }
    }

    #[tokio::test]
    async fn test_fails_twice_then_succeeds() {
        let handler = Arc::new(ScriptedHandler::new(vec![
            Step::Fail(AttemptError::Network("reset".into())),
            Step::Fail(status(502)),
            Step::Respond(json!([{ "id": 1 }])),
        ]));
        let transport = transport(handler.clone(), 3);

        let value = transport.get("/users").await.unwrap();
        assert_eq!(value, json!([{ "id": 1 }]));
        assert_eq!(handler.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_network_error() {
        let handler = Arc::new(ScriptedHandler::new(vec![
            Step::Fail(AttemptError::Network("refused".into())),
            Step::Fail(AttemptError::Network("refused".into())),
        ]));
        let err = transport(handler.clone(), 2).get("/users").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(handler.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_last_error_decides_classification() {
        let handler = Arc::new(ScriptedHandler::new(vec![
            Step::Fail(AttemptError::Network("refused".into())),
            Step::Fail(status(500)),
        ]));
        let err = transport(handler, 2).get("/users").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[tokio::test]
    async fn test_non_2xx_is_retried() {
        let handler = Arc::new(ScriptedHandler::new(vec![
            Step::Fail(status(404)),
            Step::Respond(json!({})),
        ]));
        let value = transport(handler.clone(), 3).delete("/users/1").await.unwrap();
        assert_eq!(value, json!({}));
        assert_eq!(handler.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_client_error_exhausts_to_unknown() {
        let handler = Arc::new(ScriptedHandler::new(vec![Step::Fail(status(404))]));
        let err = transport(handler, 1).get("/users/99").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let handler = Arc::new(ScriptedHandler::new(vec![
            Step::Hang,
            Step::Respond(json!([])),
        ]));
        let transport = Transport::new(handler.clone())
            .with_timeout(Duration::from_millis(20))
            .with_retry(RetryPolicy::linear(3, Duration::from_millis(1)));

        let err = transport.get("/users").await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout { .. }));
        assert_eq!(handler.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_wrappers_set_method_and_body() {
        let handler = Arc::new(ScriptedHandler::new(vec![
            Step::Respond(json!({ "id": 11 })),
            Step::Respond(json!({ "id": 2 })),
        ]));
        let transport = transport(handler.clone(), 1);

        transport.post("/users", json!({ "name": "A" })).await.unwrap();
        transport.put("/users/2", json!({ "name": "B" })).await.unwrap();

        let requests = handler.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].body, Some(json!({ "name": "A" })));
        assert_eq!(requests[1].method, Method::Put);
        assert_eq!(requests[1].path, "/users/2");
    }
}
