//! Storage layer: user records and refresh-token revocations.
//!
//! The login flow talks to two narrow collaborators: a [`UserStore`] for
//! account records and a [`RevocationStore`] for the refresh-token
//! blacklist. Both are implemented by Firestore for deployments and by an
//! in-process store for local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use async_trait::async_trait;

use crate::models::{ProfileImage, User};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const REVOKED_TOKENS: &str = "revoked_tokens";
    pub const PROFILE_IMAGES: &str = "profile_images";
}

/// Errors surfaced by the stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Uniqueness violation on the subject identifier.
    #[error("record already exists")]
    AlreadyExists,

    /// The email is held by another active account.
    #[error("email already in use by an active account")]
    EmailInUse,

    #[error("{0}")]
    Backend(String),
}

/// Account records, looked up by exact subject identifier only.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup by Google subject.
    async fn find_by_subject(&self, google_sub: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new record. Fails with [`StoreError::AlreadyExists`] when a
    /// record for the subject exists, so concurrent first logins cannot
    /// create duplicates.
    async fn create(&self, user: User) -> Result<User, StoreError>;

    /// Update the verified flag on an existing record.
    async fn set_verified(&self, google_sub: &str, verified: bool) -> Result<(), StoreError>;

    /// Store an image and set its reference on the user record. Returns the
    /// stored reference.
    async fn attach_profile_picture(
        &self,
        google_sub: &str,
        image: ProfileImage,
    ) -> Result<String, StoreError>;
}

/// Refresh-token blacklist keyed by token id (`jti`).
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record a revocation. Idempotent: returns `false` when the token was
    /// already revoked.
    async fn revoke(&self, jti: &str, expires_at: i64) -> Result<bool, StoreError>;

    /// Whether the token id has been revoked.
    async fn is_revoked(&self, jti: &str) -> Result<bool, StoreError>;
}
