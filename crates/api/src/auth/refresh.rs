//! Server-side record of the current refresh token.
//!
//! Refresh tokens are signed, high-entropy strings, so a fast deterministic
//! SHA-256 digest is enough to make the stored value useless to someone
//! reading the database. Only the digest is written, one per user,
//! overwritten on every issuance.

use std::sync::Arc;
use std::time::Duration;

use dispatch_core::types::UserId;
use dispatch_core::users::UserStore;
use sha2::{Digest, Sha256};

use super::error::AuthError;
use super::with_deadline;

/// Compute the SHA-256 hex digest of a refresh token.
///
/// Pure: the same input always yields the same 64-character output.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stores and checks refresh-token digests through a [`UserStore`].
#[derive(Clone)]
pub struct RefreshTokenVault {
    store: Arc<dyn UserStore>,
    deadline: Duration,
}

impl RefreshTokenVault {
    pub fn new(store: Arc<dyn UserStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Record `refresh_token` as the user's current one, replacing any prior.
    ///
    /// Concurrent logins for one user race; the last write wins.
    pub async fn persist(&self, user_id: UserId, refresh_token: &str) -> Result<(), AuthError> {
        let hash = hash_refresh_token(refresh_token);
        with_deadline(
            self.deadline,
            "store_refresh_hash",
            self.store.store_refresh_hash(user_id, &hash),
        )
        .await?;
        tracing::debug!(user_id = %user_id, "Stored refresh token digest");
        Ok(())
    }

    /// `true` if `refresh_token` is the one currently on record for the user.
    pub async fn matches(&self, user_id: UserId, refresh_token: &str) -> Result<bool, AuthError> {
        let stored = with_deadline(
            self.deadline,
            "fetch_refresh_hash",
            self.store.fetch_refresh_hash(user_id),
        )
        .await?;
        Ok(stored.is_some_and(|stored| stored == hash_refresh_token(refresh_token)))
    }
}
