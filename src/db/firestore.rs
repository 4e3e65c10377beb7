// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore storage backend with typed operations.
//!
//! Provides the production implementation of both store traits:
//! - Users (account records keyed by Google subject)
//! - Revoked tokens (refresh-token blacklist keyed by jti)
//! - Profile images (fetched picture bytes, base64 in the document)

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use firestore::errors::FirestoreError;
use serde::{Deserialize, Serialize};

use crate::db::{collections, RevocationStore, StoreError, UserStore};
use crate::models::{ProfileImage, User};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

/// Blacklist entry for a revoked refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RevokedToken {
    jti: String,
    /// When the token itself expires (Unix seconds); entries past this are
    /// garbage, kept only until a TTL policy removes them.
    expires_at: i64,
    revoked_at: String,
}

/// Stored profile image document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredImage {
    file_name: String,
    content_type: String,
    data_base64: String,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    async fn get_user(&self, google_sub: &str) -> Result<Option<User>, StoreError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(google_sub)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.google_sub)
            .object(user)
            .execute()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for FirestoreDb {
    async fn find_by_subject(&self, google_sub: &str) -> Result<Option<User>, StoreError> {
        self.get_user(google_sub).await
    }

    async fn create(&self, user: User) -> Result<User, StoreError> {
        // Email uniqueness among active accounts. Not atomic with the insert,
        // but the insert itself carries the subject-uniqueness constraint.
        let email = user.email.clone();
        let holders: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| {
                q.for_all([
                    q.field("email").eq(email.clone()),
                    q.field("active").eq(true),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if holders.iter().any(|u| u.google_sub != user.google_sub) {
            return Err(StoreError::EmailInUse);
        }

        let created: Result<User, FirestoreError> = self
            .client
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.google_sub)
            .object(&user)
            .execute()
            .await;

        match created {
            Ok(created) => Ok(created),
            Err(FirestoreError::DataConflictError(_)) => Err(StoreError::AlreadyExists),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }

    async fn set_verified(&self, google_sub: &str, verified: bool) -> Result<(), StoreError> {
        let mut user = self.get_user(google_sub).await?.ok_or_else(|| {
            StoreError::Backend(format!("no user record for subject {google_sub}"))
        })?;
        user.verified = verified;
        self.upsert_user(&user).await
    }

    async fn attach_profile_picture(
        &self,
        google_sub: &str,
        image: ProfileImage,
    ) -> Result<String, StoreError> {
        let stored = StoredImage {
            file_name: image.file_name.clone(),
            content_type: image.content_type,
            data_base64: STANDARD.encode(&image.data),
        };

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::PROFILE_IMAGES)
            .document_id(google_sub)
            .object(&stored)
            .execute()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut user = self.get_user(google_sub).await?.ok_or_else(|| {
            StoreError::Backend(format!("no user record for subject {google_sub}"))
        })?;
        user.profile_picture = Some(stored.file_name.clone());
        self.upsert_user(&user).await?;

        Ok(stored.file_name)
    }
}

#[async_trait]
impl RevocationStore for FirestoreDb {
    async fn revoke(&self, jti: &str, expires_at: i64) -> Result<bool, StoreError> {
        let existing: Option<RevokedToken> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::REVOKED_TOKENS)
            .obj()
            .one(jti)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if existing.is_some() {
            return Ok(false);
        }

        let entry = RevokedToken {
            jti: jti.to_string(),
            expires_at,
            revoked_at: chrono::Utc::now().to_rfc3339(),
        };

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::REVOKED_TOKENS)
            .document_id(jti)
            .object(&entry)
            .execute()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(true)
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, StoreError> {
        let existing: Option<RevokedToken> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::REVOKED_TOKENS)
            .obj()
            .one(jti)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(existing.is_some())
    }
}
