//! User and credential records and the persistence interface consumed by the
//! authentication layer.
//!
//! The auth layer never talks to a database directly; it goes through
//! [`UserStore`], which has exactly the lookups it needs: credential by
//! login, user by id, delete by id, and store/fetch of the hashed refresh
//! token. `dispatch-db` provides the PostgreSQL implementation and
//! [`memory::MemoryUserStore`] an in-process one.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::roles::Role;
use crate::types::{Timestamp, UserId};

/// What the credential check needs to know about a user.
///
/// `password_hash` is an Argon2 PHC string written once at signup.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: UserId,
    pub login: String,
    pub password_hash: String,
    pub role: Role,
}

/// Public view of a user. Carries no password or refresh-token material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub username: String,
    pub role: Role,
    pub created_at: Timestamp,
}

/// Input for creating a user at signup. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
    pub username: String,
    pub role: Role,
}

/// Failure reported by a [`UserStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. a taken login).
    #[error("Duplicate value: {0}")]
    Duplicate(String),

    /// The backend failed (connection loss, bad row, ...).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Persistence operations the auth layer depends on.
///
/// Implementations must not retry internally on behalf of the caller beyond
/// what their own driver does; callers bound every call with a deadline and
/// cancel by dropping the future.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user and return its new id.
    async fn insert_user(&self, input: &NewUser) -> Result<UserId, StoreError>;

    /// Look up the credential row for `login` (exact match).
    async fn find_credential_by_login(
        &self,
        login: &str,
    ) -> Result<Option<Credential>, StoreError>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Delete a user. Returns `true` if a row was removed.
    async fn delete_user_by_id(&self, id: UserId) -> Result<bool, StoreError>;

    /// Overwrite the stored refresh-token hash for `id` (last write wins).
    async fn store_refresh_hash(&self, id: UserId, hash: &str) -> Result<(), StoreError>;

    /// Fetch the stored refresh-token hash, if the user exists and has one.
    async fn fetch_refresh_hash(&self, id: UserId) -> Result<Option<String>, StoreError>;
}
