//! API product catalog endpoints

use crate::api::account_from_headers;
use crate::entity::ApiProductEntity;
use crate::error::{AppError, Result};
use crate::policy::Account;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;

const ADMIN_PERMISSION: &str = "administer api_product";

fn can_see(account: &Account, product: &dyn ApiProductEntity) -> bool {
    product.is_public() || account.has_permission(ADMIN_PERMISSION)
}

/// GET /api/v1/api-products
pub async fn list_api_products(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>> {
    let account = account_from_headers(&headers)?;
    let products = state.api_product_controller.list().await?;

    let visible = products
        .iter()
        .filter(|product| can_see(&account, product.as_ref()))
        .map(|product| product.to_value())
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(visible))
}

/// GET /api/v1/api-products/{name}
pub async fn get_api_product(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let account = account_from_headers(&headers)?;
    let product = state.api_product_controller.load(&name).await?;

    // Private products are indistinguishable from missing ones.
    if !can_see(&account, product.as_ref()) {
        return Err(AppError::NotFound(format!("API product {} not found", name)));
    }

    Ok(Json(product.to_value()?))
}
