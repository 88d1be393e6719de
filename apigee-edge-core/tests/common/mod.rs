//! Common test utilities

#![allow(dead_code)]

use apigee_edge_core::config::{Config, EdgeConfig, EntityClassConfig, TelemetryConfig};
use apigee_edge_core::server::{build_router, build_state};
use axum::Router;
use std::collections::HashMap;
use wiremock::MockServer;

pub const ORGANIZATION: &str = "test-org";

/// User id with a developer account in the test directory.
pub const DEVELOPER_UID: u64 = 2;
pub const DEVELOPER_EMAIL: &str = "dev@example.com";

/// Edge config pointing at the mock server
pub fn edge_config(mock_server: &MockServer) -> EdgeConfig {
    EdgeConfig {
        endpoint: format!("{}/v1", mock_server.uri()),
        organization: ORGANIZATION.to_string(),
        username: "admin@example.com".to_string(),
        password: "secret".to_string(),
        timeout_secs: 5,
    }
}

pub fn test_config(mock_server: &MockServer) -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        edge: edge_config(mock_server),
        entity_classes: EntityClassConfig::default(),
        developer_directory: HashMap::from([(DEVELOPER_UID, DEVELOPER_EMAIL.to_string())]),
        telemetry: TelemetryConfig::default(),
    }
}

/// Router backed by the mock Edge server
pub fn test_router(mock_server: &MockServer) -> Router {
    let state = build_state(test_config(mock_server), None).expect("Failed to build state");
    build_router(state)
}
