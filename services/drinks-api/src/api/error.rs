//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Builds the `{success, error, message, code}` envelope every failing
//! request returns, whether the failure came from authorization, request
//! parsing, the store, an unknown route or a panic.
//!
//! # Key invariants and assumptions
//! - `body.error` always equals the response status.
//! - Authorization failures keep their own status (400/401/403/500) and are
//!   never folded into 422.
//!
//! # Security considerations
//! - Internal and authorization details are logged server-side only; the
//!   message is a fixed client-safe string.
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use drinks_authz::AuthError;
use std::any::Any;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            body: ErrorResponse {
                success: false,
                error: status.as_u16(),
                message: message.to_string(),
                code: code.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ApiError::new(status, err.code(), err.description())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected request body");
        let status = rejection.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return api_unprocessable();
        }
        ApiError::new(
            status,
            "invalid_body",
            status.canonical_reason().unwrap_or("invalid request body"),
        )
    }
}

pub fn api_not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", "resource not found")
}

pub fn api_unprocessable() -> ApiError {
    ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        "unprocessable",
        "unprocessable",
    )
}

/// Log the store error and return a generic 500.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "drinks storage error");
    api_internal_message(message)
}

pub fn api_internal_message(message: &str) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Fallback for routes that do not exist.
pub async fn route_not_found() -> ApiError {
    api_not_found()
}

/// Converts a handler panic into the 500 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    api_internal_message("Internal Server Error").into_response()
}
