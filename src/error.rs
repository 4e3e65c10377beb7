// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Callback hit without an authorization code.
    #[error("Code is required")]
    MissingCode,

    /// The code-for-claims exchange with Google failed.
    #[error("Token exchange failed: {0}")]
    CodeExchange(String),

    /// Google reports the account email as unverified.
    #[error("Email verification required. Verify with Google before authenticating")]
    UnverifiedEmail,

    /// New-user validation failed before persistence.
    #[error("User provisioning failed: {0}")]
    Provisioning(String),

    /// The resolved user cannot be authenticated (e.g. deactivated).
    #[error("Invalid credentials")]
    Authentication,

    /// No authenticated principal on a protected route.
    #[error("Unauthorized or invalid request")]
    Unauthorized,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Unexpected failure while processing a presented token.
    #[error("Token processing failed: {0}")]
    TokenProcessing(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body.
///
/// The logout/token endpoints include `success: false`; the login flow
/// responds with a bare `error` field.
#[derive(Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, success) = match &self {
            AppError::MissingCode => (StatusCode::BAD_REQUEST, None),
            AppError::CodeExchange(_) => (StatusCode::BAD_REQUEST, None),
            AppError::UnverifiedEmail => (StatusCode::BAD_REQUEST, None),
            AppError::Provisioning(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            AppError::Authentication => (StatusCode::UNAUTHORIZED, None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, Some(false)),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, Some(false)),
            AppError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, Some(false)),
            AppError::TokenProcessing(_) => (StatusCode::BAD_REQUEST, Some(false)),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                return internal_error_response();
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                return internal_error_response();
            }
        };

        let body = ErrorResponse {
            success,
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Opaque 500 response; details stay in the logs.
fn internal_error_response() -> Response {
    let body = ErrorResponse {
        success: None,
        error: "Internal server error".to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
