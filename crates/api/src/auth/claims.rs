//! Claims carried inside signed tokens.
//!
//! [`TokenClaims`] is the wire payload. It only becomes a [`VerifiedClaims`]
//! inside [`TokenIssuer::validate`](super::jwt::TokenIssuer::validate), after
//! the MAC and expiry have been checked, so downstream code cannot get a role
//! or subject out of a token that was never verified.
//!
//! [`peek_subject`] reads the `jti` without verification. It is for log
//! context on rejected requests only.

use dispatch_core::roles::Role;
use dispatch_core::types::UserId;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::AuthError;

/// JWT payload shared by access and refresh tokens.
///
/// `role` is present on access tokens only. `jti` holds the user id and
/// `sid` a fresh id per issuance; both are identical in the two tokens of
/// one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Subject correlation id: the user's UUID as a string.
    pub jti: String,
    /// Issuance id, new for every pair.
    pub sid: Uuid,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Claims of a token whose signature and expiry have been checked.
///
/// Only constructible from within the `auth` module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    role: Option<Role>,
    subject_id: UserId,
    session_id: Uuid,
    issued_at: i64,
    expires_at: i64,
}

impl VerifiedClaims {
    /// Role claim; `None` for refresh tokens.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn subject_id(&self) -> UserId {
        self.subject_id
    }

    /// Per-issuance id shared by both tokens of a pair.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

/// Turn a verified payload into [`VerifiedClaims`].
///
/// A `jti` that is not a UUID was never issued by us, so it is reported the
/// same way as a bad signature.
pub(super) fn extract(claims: TokenClaims) -> Result<VerifiedClaims, AuthError> {
    let subject_id = Uuid::parse_str(&claims.jti).map_err(|_| AuthError::InvalidSignature)?;
    Ok(VerifiedClaims {
        role: claims.role,
        subject_id,
        session_id: claims.sid,
        issued_at: claims.iat,
        expires_at: claims.exp,
    })
}

/// Best-effort read of the `jti` claim WITHOUT verifying the token.
///
/// Never use the result for an authorization decision.
pub(crate) fn peek_subject(raw: &str) -> Option<String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(raw, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.jti)
}
