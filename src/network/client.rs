//! HTTP transport - executes API requests and classifies failures

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::network::endpoints::{ApiRequest, HttpMethod};
use crate::network::envelope::error_from_body;

/// Seam between the store and the remote API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`, with `token` as bearer when given, and returns the JSON
    /// body of a 2xx answer (`Null` when empty)
    async fn send(&self, request: ApiRequest, token: Option<String>) -> Result<Value, ApiError>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        HttpTransport {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(create_client(config), config.api_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request from the given parameters
    fn build_request(&self, request: &ApiRequest, token: Option<&str>) -> reqwest::RequestBuilder {
        let url = self.url(&request.path);
        let mut req_builder = match request.method {
            HttpMethod::GET => self.client.get(&url),
            HttpMethod::POST => self.client.post(&url),
            HttpMethod::PUT => self.client.put(&url),
            HttpMethod::PATCH => self.client.patch(&url),
            HttpMethod::DELETE => self.client.delete(&url),
        };

        req_builder = req_builder.header("Accept", "application/json");

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        if request.authenticated {
            if let Some(token) = token {
                req_builder = req_builder.bearer_auth(token);
            }
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        req_builder
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest, token: Option<String>) -> Result<Value, ApiError> {
        let start = Instant::now();
        let result = self.build_request(&request, token.as_deref()).send().await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(path = %request.path, error = %e, "Request failed");
                return Err(classify_transport_error(&e));
            }
        };

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Error reading body: {}", e)))?;
        tracing::info!(
            method = request.method.as_str(),
            path = %request.path,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
        interpret(status, &body)
    }
}

fn classify_transport_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_connect() {
        ApiError::Network(format!("Connection failed: {}", e))
    } else {
        ApiError::Network(format!("Request failed: {}", e))
    }
}

/// Turns a status and body into the payload or the matching error
pub fn interpret(status: u16, body: &str) -> Result<Value, ApiError> {
    if !(200..300).contains(&status) {
        return Err(error_from_body(status, body));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Create an HTTP client with the configured timeout
pub fn create_client(config: &ClientConfig) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().unwrap_or_else(|_| reqwest::Client::new())
}
