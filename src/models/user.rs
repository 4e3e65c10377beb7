//! User model for storage and API.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// User record, keyed by the Google subject identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Google subject identifier (also used as document ID)
    pub google_sub: String,
    /// Username derived from the email local-part at signup
    pub username: String,
    /// Given name from the identity claims
    pub first_name: String,
    /// Surname from the identity claims (may be empty)
    pub last_name: String,
    /// Generated public channel handle
    pub handle: String,
    /// Email address (unique among active accounts)
    pub email: String,
    /// Whether the provider has verified the email
    pub verified: bool,
    /// Whether the account may authenticate
    pub active: bool,
    /// Stored profile image reference
    pub profile_picture: Option<String>,
    /// When the user first signed in (RFC 3339)
    pub created_at: String,
}

/// Input shape for first-time provisioning.
///
/// Validation runs on this type before anything touches the store, so a
/// rejected signup never leaves a partial record behind.
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    #[validate(length(min = 1))]
    pub google_sub: String,
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 64))]
    pub first_name: String,
    #[validate(length(max = 64))]
    pub last_name: String,
    #[validate(length(min = 2, max = 64))]
    pub handle: String,
    #[validate(email)]
    pub email: String,
}

impl NewUser {
    /// Finalize into a storable record. New accounts start verified and
    /// active; the picture is attached separately, best-effort.
    pub fn into_user(self) -> User {
        User {
            google_sub: self.google_sub,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            handle: self.handle,
            email: self.email,
            verified: true,
            active: true,
            profile_picture: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Fetched profile image handed to the store for attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileImage {
    /// Reference stored on the user record
    pub file_name: String,
    /// MIME type reported by the image host
    pub content_type: String,
    /// Raw image bytes
    pub data: Vec<u8>,
}
