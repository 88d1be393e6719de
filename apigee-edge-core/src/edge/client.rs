//! Apigee Edge management API transport
//!
//! `EdgeTransport` is the narrow seam the entity controllers talk through.
//! `EdgeClient` is the production implementation over reqwest; tests swap in
//! a mock or point the client at a WireMock server.

use crate::config::EdgeConfig;
use crate::error::{AppError, Result};
use crate::telemetry::metrics::record_edge_request;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// A single management API call, relative to the configured endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl EdgeRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Organization-agnostic access to the management API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EdgeTransport: Send + Sync {
    /// Send a request and return the decoded JSON body (`Value::Null` when empty).
    async fn request(&self, request: EdgeRequest) -> Result<Value>;
}

/// Apigee Edge management API client
#[derive(Clone)]
pub struct EdgeClient {
    config: EdgeConfig,
    http_client: Client,
}

impl EdgeClient {
    /// Create a new management API client
    pub fn new(config: EdgeConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Get the management API base URL
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Get the configured organization
    pub fn organization(&self) -> &str {
        &self.config.organization
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl EdgeTransport for EdgeClient {
    async fn request(&self, request: EdgeRequest) -> Result<Value> {
        let url = self.url(&request.path);
        let method = request.method.clone();
        debug!(method = %method, path = %request.path, "Sending Apigee Edge request");

        let mut builder = self
            .http_client
            .request(method.clone(), &url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                record_edge_request(
                    method.as_str(),
                    "transport_error",
                    start.elapsed().as_secs_f64(),
                );
                return Err(AppError::Edge(format!(
                    "Failed to {} {}: {}",
                    method, request.path, e
                )));
            }
        };

        let status = response.status();
        let outcome = if status.is_success() { "success" } else { "error" };
        record_edge_request(method.as_str(), outcome, start.elapsed().as_secs_f64());

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{} not found", request.path)));
        }

        if status == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Conflict(error_message(&body)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Edge(format!(
                "{} {} returned {} - {}",
                method,
                request.path,
                status,
                error_message(&body)
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Edge(format!("Failed to read response body: {}", e)))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Edge(format!("Failed to parse response: {}", e)))
    }
}

/// Pull `message` out of an Edge fault body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
