use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use plateau_catalog::{CatalogError, CatalogStoreError};
use plateau_order::OrderError;

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::ProductNotFound(_)
            | OrderError::InsufficientStock { .. }
            | OrderError::Validation(_)
            | OrderError::InvalidStatus(_) => AppError::BadRequest(err.to_string()),
            OrderError::NotFound(_) => AppError::NotFound(err.to_string()),
            OrderError::Forbidden(msg) => AppError::Forbidden(msg),
            OrderError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
        }
    }
}

impl From<CatalogStoreError> for AppError {
    fn from(err: CatalogStoreError) -> Self {
        match err {
            CatalogStoreError::Backend(e) => AppError::Internal(e.to_string()),
        }
    }
}
