//! Signup, login, refresh and account flows.
//!
//! [`AuthService`] is built once at startup and shared through `AppState`.
//! It owns the [`CredentialStore`], the [`RefreshTokenVault`] and a handle
//! to the shared [`TokenIssuer`]; handlers stay thin.

use std::sync::Arc;
use std::time::Duration;

use dispatch_core::error::CoreError;
use dispatch_core::roles::Role;
use dispatch_core::types::UserId;
use dispatch_core::users::{NewUser, StoreError, User, UserStore};

use super::credentials::CredentialStore;
use super::error::AuthError;
use super::jwt::{TokenIssuer, TokenPair};
use super::password::validate_password_strength;
use super::refresh::RefreshTokenVault;
use super::with_deadline;
use crate::error::{AppError, AppResult};

/// Validated signup input with the role already parsed.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub login: String,
    pub password: String,
    pub username: String,
    pub role: Role,
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    issuer: Arc<TokenIssuer>,
    credentials: CredentialStore,
    vault: RefreshTokenVault,
    deadline: Duration,
    password_min_length: usize,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        issuer: Arc<TokenIssuer>,
        deadline: Duration,
        password_min_length: usize,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(Arc::clone(&store), deadline),
            vault: RefreshTokenVault::new(Arc::clone(&store), deadline),
            store,
            issuer,
            deadline,
            password_min_length,
        }
    }

    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    /// Create a user. The password is hashed before it reaches the store.
    pub async fn sign_up(&self, input: SignUp) -> AppResult<UserId> {
        let login = input.login.trim();
        if login.is_empty() {
            return Err(CoreError::Validation("login must not be empty".into()).into());
        }
        if input.username.trim().is_empty() {
            return Err(CoreError::Validation("username must not be empty".into()).into());
        }
        validate_password_strength(&input.password, self.password_min_length)
            .map_err(CoreError::Validation)?;

        let password_hash = CredentialStore::hash(&input.password)?;
        let new_user = NewUser {
            login: login.to_string(),
            password_hash,
            username: input.username.trim().to_string(),
            role: input.role,
        };

        let id = with_deadline(self.deadline, "insert_user", self.store.insert_user(&new_user))
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => {
                    AppError::Core(CoreError::Conflict(format!("login {login:?} is already taken")))
                }
                other => AppError::Auth(other.into()),
            })?;

        tracing::info!(user_id = %id, role = %input.role, "User signed up");
        Ok(id)
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// Both credential failures surface as the same `INVALID_CREDENTIALS`
    /// response; the distinction only reaches the logs.
    pub async fn login(&self, login: &str, password: &str) -> AppResult<TokenPair> {
        let (user_id, role) = match self.credentials.verify(login, password).await {
            Ok(found) => found,
            Err(err) => {
                if err.is_credential_failure() {
                    tracing::debug!(reason = %err, "Login rejected");
                }
                return Err(err.into());
            }
        };

        let pair = self.issue_and_persist(role, user_id).await?;
        tracing::info!(user_id = %user_id, role = %role, "User logged in");
        Ok(pair)
    }

    /// Exchange the current refresh token for a new pair.
    ///
    /// The token must verify, must not carry a role (access tokens are not
    /// accepted here), and must be the one on record for its subject. The
    /// new pair replaces the stored digest, so the presented token is spent.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.issuer.validate(refresh_token)?;
        if claims.role().is_some() {
            return Err(AuthError::InvalidSignature.into());
        }
        let user_id = claims.subject_id();

        if !self.vault.matches(user_id, refresh_token).await? {
            tracing::debug!(user_id = %user_id, "Refresh token is not current");
            return Err(AuthError::RefreshTokenMismatch.into());
        }

        let user = self
            .lookup_user(user_id)
            .await?
            .ok_or(AuthError::RefreshTokenMismatch)?;

        let pair = self.issue_and_persist(user.role, user_id).await?;
        tracing::info!(user_id = %user_id, "Token pair refreshed");
        Ok(pair)
    }

    /// Public profile of `user_id`, failing with 404 if it does not exist.
    pub async fn find_user(&self, user_id: UserId) -> AppResult<User> {
        self.lookup_user(user_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "User",
                    id: user_id,
                }
                .into()
            })
    }

    /// Delete `user_id`, failing with 404 if it does not exist.
    pub async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        let deleted = with_deadline(
            self.deadline,
            "delete_user_by_id",
            self.store.delete_user_by_id(user_id),
        )
        .await
        .map_err(AuthError::from)?;

        if !deleted {
            return Err(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }
            .into());
        }
        tracing::info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    async fn lookup_user(&self, user_id: UserId) -> Result<Option<User>, AuthError> {
        Ok(with_deadline(self.deadline, "find_user_by_id", self.store.find_user_by_id(user_id)).await?)
    }

    /// Issue a pair, check it is correlated, then record the refresh digest.
    async fn issue_and_persist(&self, role: Role, user_id: UserId) -> AppResult<TokenPair> {
        let pair = self.issuer.issue(role, user_id)?;
        if !self.issuer.correlate(&pair)? {
            return Err(AppError::InternalError(
                "issued token pair does not share a subject".into(),
            ));
        }
        self.vault.persist(user_id, &pair.refresh_token).await?;
        Ok(pair)
    }
}
