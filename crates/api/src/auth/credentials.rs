//! Login/password verification against the stored Argon2 hash.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use dispatch_core::roles::Role;
use dispatch_core::types::UserId;
use dispatch_core::users::UserStore;

use super::error::AuthError;
use super::password::{hash_password, verify_password};
use super::with_deadline;

/// Hash checked against when the login does not exist, so unknown logins
/// cost the same Argon2 work as wrong passwords.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| hash_password("dispatch-unknown-login").ok())
        .as_deref()
}

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn UserStore>,
    deadline: Duration,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn UserStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Check `password` for `login`, returning the user's id and role.
    ///
    /// Fails with [`AuthError::CredentialNotFound`] or
    /// [`AuthError::PasswordMismatch`]; callers must not expose which.
    pub async fn verify(&self, login: &str, password: &str) -> Result<(UserId, Role), AuthError> {
        let credential = with_deadline(
            self.deadline,
            "find_credential_by_login",
            self.store.find_credential_by_login(login),
        )
        .await?;

        let Some(credential) = credential else {
            if let Some(hash) = dummy_hash() {
                let _ = verify_password(password, hash);
            }
            return Err(AuthError::CredentialNotFound);
        };

        let matched = verify_password(password, &credential.password_hash).map_err(|e| {
            tracing::error!(user_id = %credential.user_id, error = %e, "Stored password hash is unreadable");
            AuthError::HashFailure(e.to_string())
        })?;

        if !matched {
            return Err(AuthError::PasswordMismatch);
        }
        Ok((credential.user_id, credential.role))
    }

    /// Hash a new password for storage at signup.
    pub fn hash(password: &str) -> Result<String, AuthError> {
        hash_password(password).map_err(|e| AuthError::HashFailure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use dispatch_core::users::memory::MemoryUserStore;
    use dispatch_core::users::NewUser;

    use super::*;

    async fn store_with(login: &str, password: &str, role: Role) -> (Arc<MemoryUserStore>, UserId) {
        let store = Arc::new(MemoryUserStore::new());
        let id = store
            .insert_user(&NewUser {
                login: login.into(),
                password_hash: CredentialStore::hash(password).unwrap(),
                username: login.into(),
                role,
            })
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_verify_returns_id_and_role() {
        let (store, id) = store_with("alice", "secret", Role::Client).await;
        let creds = CredentialStore::new(store, Duration::from_secs(5));

        assert_eq!(creds.verify("alice", "secret").await, Ok((id, Role::Client)));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_login() {
        let (store, _) = store_with("alice", "secret", Role::Client).await;
        let creds = CredentialStore::new(store, Duration::from_secs(5));

        let wrong = creds.verify("alice", "wrong").await.unwrap_err();
        assert_eq!(wrong, AuthError::PasswordMismatch);
        assert!(wrong.is_credential_failure());

        let unknown = creds.verify("mallory", "secret").await.unwrap_err();
        assert_eq!(unknown, AuthError::CredentialNotFound);
        assert!(unknown.is_credential_failure());
    }

    #[tokio::test]
    async fn test_corrupt_stored_hash_is_a_hash_failure() {
        let store = Arc::new(MemoryUserStore::new());
        store
            .insert_user(&NewUser {
                login: "broken".into(),
                password_hash: "plaintext-by-mistake".into(),
                username: "broken".into(),
                role: Role::Manager,
            })
            .await
            .unwrap();
        let creds = CredentialStore::new(store, Duration::from_secs(5));

        assert_matches!(
            creds.verify("broken", "plaintext-by-mistake").await,
            Err(AuthError::HashFailure(_))
        );
    }

    #[test]
    fn test_hash_differs_from_plaintext() {
        let hash = CredentialStore::hash("secret").unwrap();
        assert_ne!(hash, "secret");
    }
}
