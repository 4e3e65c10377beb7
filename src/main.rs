// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ClipTube API Server
//!
//! Serves the Google login flow for the ClipTube front-end: OAuth redirect
//! and callback, session cookie issuance, and logout with refresh-token
//! revocation.

use cliptube_api::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryDb, RevocationStore, UserStore},
    services::{GoogleAuthClient, TokenIssuer},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting ClipTube API");

    // Initialize storage backend
    let (users, revoked_tokens): (Arc<dyn UserStore>, Arc<dyn RevocationStore>) =
        match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; records are lost on restart");
                let db = Arc::new(MemoryDb::new());
                (db.clone(), db)
            }
            StoreBackend::Firestore => {
                let db = Arc::new(
                    FirestoreDb::new(&config.gcp_project_id)
                        .await
                        .expect("Failed to connect to Firestore"),
                );
                (db.clone(), db)
            }
        };

    // Google OAuth client
    let google = GoogleAuthClient::new(&config).expect("Failed to build Google OAuth client");

    // Session token issuer
    let token_issuer = TokenIssuer::new(
        &config.jwt_signing_key,
        config.access_token_ttl_secs,
        config.refresh_token_ttl_secs,
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        users,
        revoked_tokens,
        google,
        token_issuer,
    });

    // Build router
    let app = cliptube_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cliptube_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
