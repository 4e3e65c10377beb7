// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ClipTube API: Google sign-in and session-token issuance
//!
//! This crate provides the backend login flow for the ClipTube front-end:
//! Google OAuth redirect/callback, user provisioning, and the access/refresh
//! cookie pair with revocation on logout.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use db::{RevocationStore, UserStore};
use services::{GoogleAuthClient, TokenIssuer};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub revoked_tokens: Arc<dyn RevocationStore>,
    pub google: GoogleAuthClient,
    pub token_issuer: TokenIssuer,
}
