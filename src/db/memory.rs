//! In-process storage backend.
//!
//! Backs local development and the test suite. The subject-uniqueness
//! guarantee comes from dashmap's entry API, which makes the
//! check-then-insert in [`MemoryDb::create`] atomic per key.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use async_trait::async_trait;

use crate::db::{RevocationStore, StoreError, UserStore};
use crate::models::{ProfileImage, User};

/// In-memory store implementing both storage collaborators.
#[derive(Default)]
pub struct MemoryDb {
    users: DashMap<String, User>,
    images: DashMap<String, ProfileImage>,
    revoked: DashMap<String, i64>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored user records.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Drop blacklist entries whose tokens have expired anyway.
    fn purge_expired_revocations(&self) {
        let now = chrono::Utc::now().timestamp();
        self.revoked.retain(|_, expires_at| *expires_at > now);
    }
}

#[async_trait]
impl UserStore for MemoryDb {
    async fn find_by_subject(&self, google_sub: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(google_sub).map(|entry| entry.clone()))
    }

    async fn create(&self, user: User) -> Result<User, StoreError> {
        let email_taken = self.users.iter().any(|entry| {
            entry.active && entry.email == user.email && entry.google_sub != user.google_sub
        });
        if email_taken {
            return Err(StoreError::EmailInUse);
        }

        match self.users.entry(user.google_sub.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn set_verified(&self, google_sub: &str, verified: bool) -> Result<(), StoreError> {
        match self.users.get_mut(google_sub) {
            Some(mut entry) => {
                entry.verified = verified;
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "no user record for subject {google_sub}"
            ))),
        }
    }

    async fn attach_profile_picture(
        &self,
        google_sub: &str,
        image: ProfileImage,
    ) -> Result<String, StoreError> {
        let reference = image.file_name.clone();
        let mut entry = self.users.get_mut(google_sub).ok_or_else(|| {
            StoreError::Backend(format!("no user record for subject {google_sub}"))
        })?;
        self.images.insert(google_sub.to_string(), image);
        entry.profile_picture = Some(reference.clone());
        Ok(reference)
    }
}

#[async_trait]
impl RevocationStore for MemoryDb {
    async fn revoke(&self, jti: &str, expires_at: i64) -> Result<bool, StoreError> {
        self.purge_expired_revocations();
        Ok(self.revoked.insert(jti.to_string(), expires_at).is_none())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, StoreError> {
        Ok(self.revoked.contains_key(jti))
    }
}
