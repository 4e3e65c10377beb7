// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth code exchange and profile image fetch.

use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;

/// Identity claims for an authenticated Google account.
///
/// Deserialized strictly after the exchange: `sub` and `email` are required,
/// a missing `email_verified` is treated as unverified, and the name fields
/// default to empty for accounts without a full name on file.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// Client for Google's OAuth endpoints.
///
/// Endpoint URLs come from config so tests can stand in for Google.
pub struct GoogleAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleAuthClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("failed building Google HTTP client")?;

        Ok(Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.oauth_redirect_url.clone(),
            auth_url: config.google_auth_url.clone(),
            token_url: config.google_token_url.clone(),
            userinfo_url: config.google_userinfo_url.clone(),
        })
    }

    /// Build the authorization URL the login endpoint redirects to.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?response_type=code&access_type=offline&redirect_uri={}&scope={}&client_id={}",
            self.auth_url,
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(&self.client_id),
        )
    }

    /// Exchange an authorization code for identity claims.
    ///
    /// Two calls against Google: the token endpoint turns the code into an
    /// access token, the userinfo endpoint turns that into claims. Every
    /// failure mode along the way is an exchange failure to the caller.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleClaims, AppError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::CodeExchange(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Google token endpoint rejected the code");
            return Err(AppError::CodeExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::CodeExchange(format!("invalid token response: {e}")))?;

        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::CodeExchange(format!("userinfo request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::CodeExchange(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }

        response
            .json::<GoogleClaims>()
            .await
            .map_err(|e| AppError::CodeExchange(format!("invalid userinfo response: {e}")))
    }

    /// Fetch a profile image. Best-effort from the caller's point of view:
    /// failures here never abort a login.
    pub async fn fetch_profile_image(&self, url: &str) -> anyhow::Result<(String, Vec<u8>)> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("profile image request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("profile image fetch returned {}", response.status());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .context("profile image body read failed")?;

        Ok((content_type, bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_parameters() {
        let client = GoogleAuthClient::new(&Config::test_default()).unwrap();
        let url = client.authorization_url();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("client_id=test-client-id.apps.googleusercontent.com"));
        assert!(url.contains(&format!(
            "redirect_uri={}",
            urlencoding::encode("http://localhost:8080/callback")
        )));
    }

    #[test]
    fn test_claims_defaults() {
        let claims: GoogleClaims =
            serde_json::from_str(r#"{"sub": "g1", "email": "a@x.com"}"#).unwrap();

        assert!(!claims.email_verified);
        assert!(claims.given_name.is_empty());
        assert!(claims.picture.is_none());
    }

    #[test]
    fn test_claims_require_subject() {
        let result = serde_json::from_str::<GoogleClaims>(r#"{"email": "a@x.com"}"#);
        assert!(result.is_err());
    }
}
