//! HTTP capability used by the query engine.
//!
//! The [`Transport`] trait abstracts over the blocking reqwest client so the
//! engine can be driven by scripted responses in tests. Transports attach the
//! API key; requests carry only the URL and query parameters.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::config::ClientConfig;
use crate::error::GieError;

/// Authenticated GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// First value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Status code and raw body of an upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Performs authenticated GETs. Errors are reserved for requests that never
/// produced a response; HTTP error statuses come back as an [`ApiResponse`].
pub trait Transport: Send + Sync {
    fn get(&self, request: &ApiRequest) -> Result<ApiResponse, GieError>;
}

/// Production transport over a reusable blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, GieError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GieError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, request: &ApiRequest) -> Result<ApiResponse, GieError> {
        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .header("x-key", self.api_key.as_str())
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GieError::Network(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    GieError::Network(format!("connection failed: {e}"))
                } else {
                    GieError::Network(format!("request failed: {e}"))
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| GieError::Network(format!("failed to read response body: {e}")))?;

        Ok(ApiResponse { status, body })
    }
}

/// Scripted in-memory transport for deterministic offline tests.
///
/// Replies are served in the order they were pushed; every request is
/// recorded for later inspection.
#[derive(Debug, Default)]
pub struct StubTransport {
    replies: Mutex<VecDeque<Result<ApiResponse, String>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: ApiResponse) -> &Self {
        lock(&self.replies).push_back(Ok(response));
        self
    }

    pub fn push_json(&self, body: serde_json::Value) -> &Self {
        self.push_response(ApiResponse::ok(body.to_string()))
    }

    pub fn push_status(&self, status: u16, body: impl Into<String>) -> &Self {
        self.push_response(ApiResponse {
            status,
            body: body.into(),
        })
    }

    pub fn push_network_error(&self, message: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(Err(message.into()));
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

impl Transport for StubTransport {
    fn get(&self, request: &ApiRequest) -> Result<ApiResponse, GieError> {
        lock(&self.requests).push(request.clone());
        match lock(&self.replies).pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(GieError::Network(message)),
            None => Err(GieError::Network(format!(
                "stub transport has no reply for {}",
                request.url
            ))),
        }
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &ApiRequest) -> Result<ApiResponse, GieError> {
        (**self).get(request)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_builder_collects_params() {
        let request = ApiRequest::get("https://agsi.gie.eu/api")
            .with_param("from", "2023-01-01")
            .with_params(vec![("country".to_string(), "NL".to_string())]);
        assert_eq!(request.param("from"), Some("2023-01-01"));
        assert_eq!(request.param("country"), Some("NL"));
        assert_eq!(request.param("page"), None);
    }

    #[test]
    fn stub_serves_replies_in_order_and_records_requests() {
        let stub = StubTransport::new();
        stub.push_json(json!({"data": []})).push_status(500, "boom");

        let first = stub.get(&ApiRequest::get("http://a")).unwrap();
        let second = stub.get(&ApiRequest::get("http://b")).unwrap();

        assert!(first.is_success());
        assert_eq!(second.status, 500);
        assert!(!second.is_success());
        assert_eq!(stub.requests().len(), 2);
        assert_eq!(stub.requests()[1].url, "http://b");
        assert_eq!(stub.remaining(), 0);
    }

    #[test]
    fn exhausted_stub_fails_as_network_error() {
        let stub = StubTransport::new();
        let err = stub.get(&ApiRequest::get("http://a")).unwrap_err();
        assert!(matches!(err, GieError::Network(_)));
    }

    #[test]
    fn reqwest_transport_builds_from_config() {
        let config = ClientConfig::new("key");
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
