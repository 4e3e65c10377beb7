// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Authenticated principal attached to the request once auth succeeds.
///
/// Constructed exactly once per request: here for protected routes, or by
/// the callback's authentication step for a fresh login.
#[derive(Debug, Clone)]
pub struct Principal {
    pub google_sub: String,
    pub email: String,
    pub handle: String,
}

/// Middleware that requires a valid access token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let claims = state
        .token_issuer
        .verify_access_token(&token)
        .map_err(|_| AppError::Unauthorized)?;

    let principal = Principal {
        google_sub: claims.sub,
        email: claims.email,
        handle: claims.handle,
    };
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
