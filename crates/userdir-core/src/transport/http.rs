//! reqwest-backed `HttpHandler`

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use super::{ApiRequest, AttemptError, HttpHandler, Method};

/// Sends requests to `base_url` with reqwest
///
/// Timeouts are left to `Transport`, which wraps each attempt.
#[derive(Debug, Clone)]
pub struct ReqwestHandler {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestHandler {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("userdir/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

fn network_error(error: reqwest::Error) -> AttemptError {
    if error.is_builder() {
        AttemptError::Other(error.to_string())
    } else {
        AttemptError::Network(error.to_string())
    }
}

#[async_trait]
impl HttpHandler for ReqwestHandler {
    async fn send(&self, request: &ApiRequest) -> Result<Value, AttemptError> {
        let url = self.url_for(&request.path);

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(ref body) = request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let text = response.text().await.map_err(network_error)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| AttemptError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let handler = ReqwestHandler::new("https://jsonplaceholder.typicode.com/").unwrap();
        assert_eq!(handler.base_url(), "https://jsonplaceholder.typicode.com");
        assert_eq!(
            handler.url_for("/users/3"),
            "https://jsonplaceholder.typicode.com/users/3"
        );
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(Method::Put), reqwest::Method::PUT);
        assert_eq!(reqwest::Method::from(Method::Delete), reqwest::Method::DELETE);
    }
}
