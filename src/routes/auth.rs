// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth login, callback, and logout routes.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::middleware::auth::{Principal, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::models::{NewUser, ProfileImage, User};
use crate::services::{generate_channel_handle, GoogleClaims, TokenError};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/token/refresh", post(refresh_access_token))
}

/// Routes mounted behind the auth middleware.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/logout", post(logout))
}

/// 302 redirect. The flow contract is Found; axum's `Redirect` helpers only
/// produce 303/307/308.
fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// Session cookie with the attributes both token cookies share. SameSite=None
/// so the cross-site front-end can send them; HttpOnly keeps scripts out.
fn session_cookie(name: &'static str, value: String, max_age_secs: u64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::seconds(max_age_secs as i64))
        .build()
}

/// Removal cookie matching the creation attributes for the token cookies;
/// other request cookies are cleared with the default path.
fn removal_cookie(name: String) -> Cookie<'static> {
    let token_cookie = name == ACCESS_TOKEN_COOKIE || name == REFRESH_TOKEN_COOKIE;

    let mut builder = Cookie::build((name, ""))
        .path("/")
        .max_age(time::Duration::ZERO);
    if token_cookie {
        builder = builder
            .http_only(true)
            .secure(true)
            .same_site(SameSite::None);
    }
    builder.build()
}

/// Start the login flow: redirect the browser to Google's consent screen.
async fn login(State(state): State<Arc<AppState>>) -> Response {
    let auth_url = state.google.authorization_url();

    tracing::info!(
        client_id = %state.config.google_client_id,
        "redirecting to Google authorization"
    );

    found(&auth_url)
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    /// Error reported by Google (user denied consent, etc.)
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback: exchange the code, reconcile the user record, and issue
/// the session cookie pair.
///
/// No cookie is ever set on an error path; token issuance happens strictly
/// after the user and principal are resolved.
async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return Err(AppError::CodeExchange(error));
    }

    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AppError::MissingCode)?;

    let claims = state.google.exchange_code(&code).await?;

    if !claims.email_verified {
        tracing::warn!(sub = %claims.sub, "unverified email on callback");
        return Err(AppError::UnverifiedEmail);
    }

    let user = reconcile_user(&state, &claims).await?;

    // Authentication step: a deactivated account gets no principal and no
    // tokens, even though its record may just have been re-verified.
    if !user.active {
        tracing::warn!(sub = %user.google_sub, "login attempt for deactivated account");
        return Err(AppError::Authentication);
    }

    let principal = Principal {
        google_sub: user.google_sub.clone(),
        email: user.email.clone(),
        handle: user.handle.clone(),
    };

    let access_token = state.token_issuer.issue_access_token(&principal)?;
    let (refresh_token, _) = state
        .token_issuer
        .issue_refresh_token(&principal.google_sub)?;

    tracing::info!(sub = %principal.google_sub, "login complete, issuing session cookies");

    let jar = CookieJar::new()
        .add(session_cookie(
            ACCESS_TOKEN_COOKIE,
            access_token,
            state.config.access_token_ttl_secs,
        ))
        .add(session_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token,
            state.config.refresh_token_ttl_secs,
        ));

    let redirect = format!("{}?success=true", state.config.client_address);
    Ok((jar, found(&redirect)).into_response())
}

/// Find-or-create the user record for the claims.
///
/// Idempotent: a repeat login re-verifies the existing record, and losing
/// the first-login creation race falls back to the winner's record.
async fn reconcile_user(state: &AppState, claims: &GoogleClaims) -> Result<User> {
    if let Some(mut user) = state
        .users
        .find_by_subject(&claims.sub)
        .await
        .map_err(store_error)?
    {
        state
            .users
            .set_verified(&claims.sub, true)
            .await
            .map_err(store_error)?;
        user.verified = true;
        return Ok(user);
    }

    let username = claims
        .email
        .split('@')
        .next()
        .unwrap_or(&claims.email)
        .to_string();

    let new_user = NewUser {
        google_sub: claims.sub.clone(),
        username,
        first_name: claims.given_name.clone(),
        last_name: claims.family_name.clone(),
        handle: generate_channel_handle(&claims.given_name, &claims.family_name),
        email: claims.email.clone(),
    };

    // Validation runs before anything touches the store
    new_user
        .validate()
        .map_err(|e| AppError::Provisioning(e.to_string()))?;

    match state.users.create(new_user.into_user()).await {
        Ok(user) => {
            tracing::info!(sub = %user.google_sub, handle = %user.handle, "new user provisioned");
            Ok(attach_profile_picture(state, user, claims).await)
        }
        Err(StoreError::AlreadyExists) => {
            // Lost the first-login race; the winner's record is authoritative
            tracing::debug!(sub = %claims.sub, "create raced with a concurrent login");
            state
                .users
                .find_by_subject(&claims.sub)
                .await
                .map_err(store_error)?
                .ok_or_else(|| {
                    AppError::Database("user record missing after create conflict".to_string())
                })
        }
        Err(StoreError::EmailInUse) => Err(AppError::Provisioning(
            "email already in use by an active account".to_string(),
        )),
        Err(e) => Err(store_error(e)),
    }
}

/// Best-effort picture attachment. The user record is already persisted and
/// a failed fetch or store must not fail the login.
async fn attach_profile_picture(state: &AppState, mut user: User, claims: &GoogleClaims) -> User {
    let Some(url) = claims.picture.as_deref() else {
        return user;
    };

    match state.google.fetch_profile_image(url).await {
        Ok((content_type, data)) => {
            let image = ProfileImage {
                file_name: format!(
                    "{}_{}_profile_picture.jpg",
                    user.first_name, user.last_name
                ),
                content_type,
                data,
            };

            match state
                .users
                .attach_profile_picture(&user.google_sub, image)
                .await
            {
                Ok(reference) => user.profile_picture = Some(reference),
                Err(e) => {
                    tracing::warn!(sub = %user.google_sub, error = %e, "failed to store profile picture")
                }
            }
        }
        Err(e) => {
            tracing::warn!(sub = %user.google_sub, error = %e, "failed to fetch profile picture")
        }
    }

    user
}

/// Revoke the presented refresh token and clear every cookie the request
/// carried. Requires an authenticated principal (enforced by middleware).
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
) -> Result<Response> {
    if let Some(cookie) = jar.get(REFRESH_TOKEN_COOKIE) {
        let claims = state
            .token_issuer
            .verify_refresh_token(cookie.value())
            .map_err(|e| match e {
                TokenError::Expired => AppError::TokenExpired,
                TokenError::Invalid(msg) => AppError::InvalidToken(msg),
            })?;

        let newly_revoked = state
            .revoked_tokens
            .revoke(&claims.jti, claims.exp as i64)
            .await
            .map_err(|e| AppError::TokenProcessing(e.to_string()))?;

        if newly_revoked {
            tracing::info!(sub = %principal.google_sub, "refresh token revoked");
        } else {
            tracing::debug!(sub = %principal.google_sub, "refresh token was already revoked");
        }
    }

    // Clear every cookie the request carried, whatever it was
    let names: Vec<String> = jar.iter().map(|cookie| cookie.name().to_string()).collect();
    let mut jar = CookieJar::new();
    for name in names {
        jar = jar.add(removal_cookie(name));
    }

    Ok((
        jar,
        Json(json!({"success": true, "message": "Logged out successfully"})),
    )
        .into_response())
}

/// Mint a fresh access token from a valid, unrevoked refresh token.
async fn refresh_access_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response> {
    let cookie = jar
        .get(REFRESH_TOKEN_COOKIE)
        .ok_or(AppError::Unauthorized)?;

    let claims = state
        .token_issuer
        .verify_refresh_token(cookie.value())
        .map_err(|e| match e {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Invalid(msg) => AppError::InvalidToken(msg),
        })?;

    // A revoked refresh token never yields another access token
    if state
        .revoked_tokens
        .is_revoked(&claims.jti)
        .await
        .map_err(|e| AppError::TokenProcessing(e.to_string()))?
    {
        tracing::warn!(sub = %claims.sub, "refresh attempt with revoked token");
        return Err(AppError::InvalidToken("token has been revoked".to_string()));
    }

    let user = state
        .users
        .find_by_subject(&claims.sub)
        .await
        .map_err(store_error)?
        .ok_or(AppError::Authentication)?;

    if !user.active {
        return Err(AppError::Authentication);
    }

    let principal = Principal {
        google_sub: user.google_sub.clone(),
        email: user.email.clone(),
        handle: user.handle.clone(),
    };
    let access_token = state.token_issuer.issue_access_token(&principal)?;

    let jar = CookieJar::new().add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        access_token,
        state.config.access_token_ttl_secs,
    ));

    Ok((jar, Json(json!({"success": true}))).into_response())
}

fn store_error(err: StoreError) -> AppError {
    AppError::Database(err.to_string())
}
