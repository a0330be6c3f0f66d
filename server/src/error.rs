//! Error codes and the JSON error response.
//!
//! DESIGN
//! ======
//! Service modules define their own `thiserror` enums and implement
//! [`ErrorCode`] so every failure carries a stable, grepable `E_*` code.
//! Routes turn those into [`ApiError`], which renders as
//! `{ "message": ..., "code": ... }` with the mapped HTTP status.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Trait for service errors that carry a machine-readable code.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    /// Whether the message is safe to show to API clients. Database and I/O
    /// failures override this so internals stay in the logs.
    fn public(&self) -> bool {
        true
    }
}

/// An error response: HTTP status plus a `{ message, code }` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    code: &'a str,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    /// Build from a service error, logging internal failures.
    #[must_use]
    pub fn from_error(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        if err.public() {
            return Self::new(status, err.error_code(), err.to_string());
        }
        tracing::error!(code = err.error_code(), error = %err, "request failed");
        Self::new(status, err.error_code(), "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { message: &self.message, code: self.code };
        (self.status, Json(body)).into_response()
    }
}
