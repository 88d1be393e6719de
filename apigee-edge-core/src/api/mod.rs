//! REST API handlers and shared request/response helpers

pub mod api_product;
pub mod entity_route;
pub mod health;
pub mod metrics;

use crate::error::{AppError, Result};
use crate::policy::Account;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header carrying the numeric user id asserted by the gateway.
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";
/// Comma separated permission names.
pub const ACCOUNT_PERMISSIONS_HEADER: &str = "x-account-permissions";
pub const ACCOUNT_NAME_HEADER: &str = "x-account-name";

/// Body of every generated-route response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub route: String,
    pub title: String,
    pub data: Value,
}

/// Read the requesting account from gateway headers. Requests without an
/// account id are anonymous.
pub fn account_from_headers(headers: &HeaderMap) -> Result<Account> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let Some(uid) = header(ACCOUNT_ID_HEADER) else {
        return Ok(Account::anonymous());
    };
    let uid = uid
        .parse::<u64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid {} header", ACCOUNT_ID_HEADER)))?;

    let mut account = Account::new(uid, header(ACCOUNT_NAME_HEADER).unwrap_or_default());
    if let Some(permissions) = header(ACCOUNT_PERMISSIONS_HEADER) {
        account.permissions = permissions
            .split(',')
            .map(str::trim)
            .filter(|permission| !permission.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(account)
}
