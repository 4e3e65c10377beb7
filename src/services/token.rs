// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access and refresh token issuance and verification.
//!
//! Both tokens are HS256 JWTs signed with the configured key. Access tokens
//! are stateless; refresh tokens carry a `jti` that the revocation store
//! blacklists on logout.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::middleware::auth::Principal;

const REFRESH_TOKEN_TYP: &str = "refresh";

/// Claims embedded in an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (Google subject identifier)
    pub sub: String,
    pub email: String,
    pub handle: String,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// Claims embedded in a refresh token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    /// Token id, recorded by the revocation store
    pub jti: String,
    /// Discriminator so an access token never passes as a refresh token
    pub typ: String,
    pub iat: usize,
    pub exp: usize,
}

/// Token verification failures; callers map these onto the API taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is expired")]
    Expired,

    #[error("{0}")]
    Invalid(String),
}

/// Issues and verifies the session token pair.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(signing_key: &[u8], access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Mint an access token for an authenticated principal.
    pub fn issue_access_token(&self, principal: &Principal) -> anyhow::Result<String> {
        let now = unix_now()?;

        let claims = AccessClaims {
            sub: principal.google_sub.clone(),
            email: principal.email.clone(),
            handle: principal.handle.clone(),
            iat: now,
            exp: now + self.access_ttl_secs as usize,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Mint a refresh token. The returned claims carry the `jti` so the
    /// logout flow can revoke exactly this token.
    pub fn issue_refresh_token(&self, google_sub: &str) -> anyhow::Result<(String, RefreshClaims)> {
        let now = unix_now()?;

        let claims = RefreshClaims {
            sub: google_sub.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            typ: REFRESH_TOKEN_TYP.to_string(),
            iat: now,
            exp: now + self.refresh_ttl_secs as usize,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;

        Ok((token, claims))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(map_jwt_error)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims = decode::<RefreshClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(map_jwt_error)?;

        if claims.typ != REFRESH_TOKEN_TYP {
            return Err(TokenError::Invalid("not a refresh token".to_string()));
        }

        Ok(claims)
    }
}

fn unix_now() -> anyhow::Result<usize> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize)
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test_jwt_key_32_bytes_minimum!!!", 3600, 86400)
    }

    fn principal() -> Principal {
        Principal {
            google_sub: "g1".to_string(),
            email: "a@x.com".to_string(),
            handle: "@AnnLee0042".to_string(),
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let issuer = issuer();
        let token = issuer.issue_access_token(&principal()).unwrap();

        let claims = issuer.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "g1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.handle, "@AnnLee0042");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_roundtrip() {
        let issuer = issuer();
        let (token, issued) = issuer.issue_refresh_token("g1").unwrap();

        let claims = issuer.verify_refresh_token(&token).unwrap();
        assert_eq!(claims.sub, "g1");
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.typ, REFRESH_TOKEN_TYP);
    }

    #[test]
    fn test_refresh_jtis_are_unique() {
        let issuer = issuer();
        let (_, first) = issuer.issue_refresh_token("g1").unwrap();
        let (_, second) = issuer.issue_refresh_token("g1").unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let issuer = issuer();
        let token = issuer.issue_access_token(&principal()).unwrap();

        // Access claims have no jti/typ, so the decode itself fails
        assert!(matches!(
            issuer.verify_refresh_token(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_detected() {
        let issuer = issuer();
        let now = unix_now().unwrap();

        let claims = AccessClaims {
            sub: "g1".to_string(),
            email: "a@x.com".to_string(),
            handle: "@AnnLee0042".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test_jwt_key_32_bytes_minimum!!!"),
        )
        .unwrap();

        assert!(matches!(
            issuer.verify_access_token(&token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let issuer = issuer();
        let other = TokenIssuer::new(b"another_key_32_bytes_long_please", 3600, 86400);

        let token = other.issue_access_token(&principal()).unwrap();
        assert!(matches!(
            issuer.verify_access_token(&token),
            Err(TokenError::Invalid(_))
        ));
    }
}
