// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated profile routes.

use axum::{extract::State, routing::get, Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::Principal;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(me))
}

/// Current user profile, re-read from the store so the response reflects
/// the latest record rather than the token claims.
async fn me(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>> {
    let user = state
        .users
        .find_by_subject(&principal.google_sub)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(json!({
        "google_sub": user.google_sub,
        "username": user.username,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "handle": user.handle,
        "email": user.email,
        "verified": user.verified,
        "active": user.active,
        "profile_picture": user.profile_picture,
        "created_at": user.created_at,
    })))
}
