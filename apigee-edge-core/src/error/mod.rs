//! Unified error handling for the Apigee Edge integration

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Apigee Edge error: {0}")]
    Edge(String),

    /// An entity class was wired to a controller whose capability it lacks.
    #[error("Entity class {entity_class} must implement {required}.")]
    InvalidBinding {
        entity_class: String,
        required: &'static str,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg.clone())
            }
            AppError::Edge(msg) => {
                tracing::error!("Apigee Edge error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "edge_error",
                    "The API management backend returned an error".to_string(),
                )
            }
            AppError::InvalidBinding { .. } => {
                tracing::error!("Invalid entity binding: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "invalid_binding",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Json(e) => {
                tracing::error!("Serialization error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "serialization_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::NotFound("App not found".to_string());
        assert_eq!(err.to_string(), "Not found: App not found");
    }

    #[test]
    fn test_invalid_binding_names_required_interface() {
        let err = AppError::InvalidBinding {
            entity_class: "DeveloperApp".to_string(),
            required: "ApiProductEntity",
        };
        assert_eq!(
            err.to_string(),
            "Entity class DeveloperApp must implement ApiProductEntity."
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: AppError = anyhow::anyhow!("Something went wrong").into();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Forbidden("no".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Edge("boom".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Validation("bad".into()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
