//! Application configuration loaded from environment variables.
//!
//! Everything external is configurable: Google endpoint URLs and token
//! lifetimes can be overridden so tests can point the login flow at a
//! local stand-in for Google.

use std::env;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Which storage backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store, for local development and tests.
    Memory,
    /// Firestore, for deployed environments.
    Firestore,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Callback URL registered with Google (`{host}/callback`)
    pub oauth_redirect_url: String,
    /// Front-end address for the post-login redirect
    pub client_address: String,
    /// JWT signing key for access and refresh tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Server port
    pub port: u16,
    /// Storage backend selector
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,

    /// Google authorization endpoint
    pub google_auth_url: String,
    /// Google token endpoint
    pub google_token_url: String,
    /// Google userinfo endpoint
    pub google_userinfo_url: String,

    /// Access token / cookie lifetime in seconds (hours-scale)
    pub access_token_ttl_secs: u64,
    /// Refresh token / cookie lifetime in seconds (days-scale)
    pub refresh_token_ttl_secs: u64,
    /// Timeout for outbound HTTP (token exchange, userinfo, images)
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("firestore") => StoreBackend::Firestore,
            Ok("memory") | Err(_) => StoreBackend::Memory,
            Ok(other) => return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        };

        Ok(Self {
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,
            oauth_redirect_url: env::var("OAUTH_REDIRECT_URL")
                .map_err(|_| ConfigError::Missing("OAUTH_REDIRECT_URL"))?,
            client_address: env::var("CLIENT_ADDRESS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),

            google_auth_url: env::var("GOOGLE_AUTH_URL")
                .unwrap_or_else(|_| GOOGLE_AUTH_URL.to_string()),
            google_token_url: env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| GOOGLE_TOKEN_URL.to_string()),
            google_userinfo_url: env::var("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|_| GOOGLE_USERINFO_URL.to_string()),

            access_token_ttl_secs: parse_env_u64("ACCESS_TOKEN_TTL_SECS", 3 * 60 * 60),
            refresh_token_ttl_secs: parse_env_u64("REFRESH_TOKEN_TTL_SECS", 7 * 24 * 60 * 60),
            http_timeout_secs: parse_env_u64("HTTP_TIMEOUT_SECS", 10),
        })
    }

    /// Config for tests: in-memory store, placeholder credentials, and
    /// Google endpoints that are expected to be overridden per test.
    pub fn test_default() -> Self {
        Self {
            google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            google_client_secret: "test-client-secret".to_string(),
            oauth_redirect_url: "http://localhost:8080/callback".to_string(),
            client_address: "http://localhost:5173".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            google_auth_url: GOOGLE_AUTH_URL.to_string(),
            google_token_url: GOOGLE_TOKEN_URL.to_string(),
            google_userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            access_token_ttl_secs: 3 * 60 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60,
            http_timeout_secs: 2,
        }
    }
}

fn parse_env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
