// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use cliptube_api::config::Config;
use cliptube_api::db::MemoryDb;
use cliptube_api::routes::create_router;
use cliptube_api::services::{GoogleAuthClient, TokenIssuer};
use cliptube_api::AppState;

/// Claims used by most scenarios: a fresh, verified Google account.
#[allow(dead_code)]
pub fn ann_lee_claims() -> serde_json::Value {
    serde_json::json!({
        "sub": "g1",
        "email": "a@x.com",
        "email_verified": true,
        "given_name": "Ann",
        "family_name": "Lee"
    })
}

/// Spawn a stand-in for Google on an ephemeral port.
///
/// `/token` accepts any code, `/userinfo` serves the given claims,
/// `/picture.jpg` serves two bytes of JPEG, `/missing.jpg` is a 404.
/// Returns the base URL.
#[allow(dead_code)]
pub async fn spawn_fake_google(userinfo: serde_json::Value) -> String {
    let app = Router::new()
        .route(
            "/token",
            post(|| async {
                Json(serde_json::json!({
                    "access_token": "fake-google-access-token",
                    "expires_in": 3599,
                    "token_type": "Bearer"
                }))
            }),
        )
        .route(
            "/userinfo",
            get(move || {
                let body = userinfo.clone();
                async move { Json(body) }
            }),
        )
        .route(
            "/picture.jpg",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "image/jpeg")],
                    vec![0xffu8, 0xd8u8],
                )
            }),
        )
        .route("/missing.jpg", get(|| async { StatusCode::NOT_FOUND }));

    spawn_server(app).await
}

/// Spawn a token endpoint that rejects every code.
#[allow(dead_code)]
pub async fn spawn_fake_google_rejecting_exchange() -> String {
    let app = Router::new().route(
        "/token",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "invalid_grant"})),
            )
        }),
    );

    spawn_server(app).await
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake Google listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// Create a test app over an in-memory store.
/// Returns the router, the shared state, and the store for assertions.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>, Arc<MemoryDb>) {
    let db = Arc::new(MemoryDb::new());
    let google = GoogleAuthClient::new(&config).expect("Failed to build Google client");
    let token_issuer = TokenIssuer::new(
        &config.jwt_signing_key,
        config.access_token_ttl_secs,
        config.refresh_token_ttl_secs,
    );

    let state = Arc::new(AppState {
        config,
        users: db.clone(),
        revoked_tokens: db.clone(),
        google,
        token_issuer,
    });

    (create_router(state.clone()), state, db)
}

/// Create a test app whose Google endpoints point at a fake serving the
/// given userinfo claims.
#[allow(dead_code)]
pub async fn create_google_backed_app(
    userinfo: serde_json::Value,
) -> (Router, Arc<AppState>, Arc<MemoryDb>) {
    let base = spawn_fake_google(userinfo).await;

    let mut config = Config::test_default();
    config.google_token_url = format!("{base}/token");
    config.google_userinfo_url = format!("{base}/userinfo");

    create_test_app_with_config(config)
}

/// All Set-Cookie header values on a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// The Set-Cookie header for a named cookie, panicking when absent.
#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

/// The value portion of a Set-Cookie header.
#[allow(dead_code)]
pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .expect("malformed Set-Cookie header")
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}
