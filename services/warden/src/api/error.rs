//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every handler returns the
//! same `{code, message}` shape.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
use crate::api::types::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use warden_authz::AuthzError;
use warden_store::StoreError;

/// Structured API error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
        },
    }
}

/// Build a 404 response with the `not_found` code.
pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 400 response with the `validation_error` code.
///
/// # What it does
/// Returns `message` to the caller unchanged, so it must not carry internal
/// details.
pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// Internal error without an underlying error to log.
pub fn api_internal_message(message: &str) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Log a store failure and return a generic 500.
///
/// # What it does
/// Logs `err` at error level and answers with `message` only.
pub fn api_store(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = %err, "policy store error");
    api_internal_message(message)
}

/// Map an authorization-layer error onto an HTTP error.
///
/// # What it does
/// - [`AuthzError::InvalidRule`] becomes a 400 carrying the rule problem.
/// - Every other variant is logged and reported as a generic 500 with
///   `message`.
pub fn api_authz(message: &str, err: &AuthzError) -> ApiError {
    match err {
        AuthzError::InvalidRule(reason) => api_validation_error(reason),
        other => {
            tracing::error!(error = %other, "policy engine error");
            api_internal_message(message)
        }
    }
}
