//! Authentication and authorization primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`credentials`] -- login/password check against the user store.
//! - [`jwt`] -- [`TokenIssuer`](jwt::TokenIssuer): issue, validate, correlate.
//! - [`claims`] -- token payload and [`VerifiedClaims`](claims::VerifiedClaims).
//! - [`refresh`] -- SHA-256 refresh-token digests and their storage.
//! - [`service`] -- signup/login/refresh flows built from the above.

pub mod claims;
pub mod credentials;
pub mod error;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod service;

use std::future::Future;
use std::time::Duration;

use dispatch_core::users::StoreError;

use self::error::AuthError;

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::PersistenceFailure(err.to_string())
    }
}

/// Run a store call under `deadline`.
///
/// Elapsing the deadline drops (cancels) the call and reports a backend
/// failure. Nothing is retried here.
pub(crate) async fn with_deadline<T, F>(
    deadline: Duration,
    op: &'static str,
    fut: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(op, deadline_ms = deadline.as_millis() as u64, "Store call timed out");
            Err(StoreError::Backend(format!(
                "{op} timed out after {}ms",
                deadline.as_millis()
            )))
        }
    }
}
