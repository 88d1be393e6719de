//! Configuration management for the Apigee Edge integration

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Apigee Edge management API connection
    pub edge: EdgeConfig,
    /// Registry names of the local entity classes bound to each controller
    pub entity_classes: EntityClassConfig,
    /// Local user id to developer email mapping
    pub developer_directory: HashMap<u64, String>,
    /// Logging and metrics
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct EdgeConfig {
    /// Management API base URL (e.g., https://api.enterprise.apigee.com/v1)
    pub endpoint: String,
    pub organization: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct EntityClassConfig {
    pub api_product: String,
    pub developer_app: String,
}

impl Default for EntityClassConfig {
    fn default() -> Self {
        Self {
            api_product: "api_product".to_string(),
            developer_app: "developer_app".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "text" or "json"
    pub log_format: String,
    pub metrics_enabled: bool,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            metrics_enabled: false,
            service_name: "apigee-edge-core".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            edge: EdgeConfig {
                endpoint: env::var("EDGE_ENDPOINT")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| "https://api.enterprise.apigee.com/v1".to_string()),
                organization: env::var("EDGE_ORGANIZATION")
                    .context("EDGE_ORGANIZATION is required")?,
                username: env::var("EDGE_USERNAME").context("EDGE_USERNAME is required")?,
                password: env::var("EDGE_PASSWORD").context("EDGE_PASSWORD is required")?,
                timeout_secs: env::var("EDGE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            },
            entity_classes: EntityClassConfig {
                api_product: env::var("API_PRODUCT_ENTITY_CLASS")
                    .unwrap_or_else(|_| "api_product".to_string()),
                developer_app: env::var("DEVELOPER_APP_ENTITY_CLASS")
                    .unwrap_or_else(|_| "developer_app".to_string()),
            },
            developer_directory: parse_developer_directory(
                &env::var("DEVELOPER_DIRECTORY").unwrap_or_else(|_| "{}".to_string()),
            )?,
            telemetry: TelemetryConfig {
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
                metrics_enabled: env::var("METRICS_ENABLED")
                    .map(|s| s.to_lowercase() == "true")
                    .unwrap_or(false),
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "apigee-edge-core".to_string()),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

/// Parse the `DEVELOPER_DIRECTORY` JSON object (`{"2": "dev@example.com"}`).
fn parse_developer_directory(raw: &str) -> Result<HashMap<u64, String>> {
    let entries: HashMap<String, String> =
        serde_json::from_str(raw).context("Invalid DEVELOPER_DIRECTORY JSON")?;

    entries
        .into_iter()
        .map(|(uid, email)| {
            let uid = uid
                .parse::<u64>()
                .with_context(|| format!("Invalid user id in DEVELOPER_DIRECTORY: {}", uid))?;
            Ok((uid, email))
        })
        .collect()
}
