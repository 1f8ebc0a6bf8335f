//! Failure taxonomy for credential checks, token handling and role gates.

/// Why an authentication or authorization step failed.
///
/// Variants carry no secret material; the `Display` text is safe to return
/// to clients for the 4xx cases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Invalid Authorization format. Expected: Bearer <token>")]
    MalformedHeader,

    /// Bad MAC, wrong algorithm, or a token that does not decode at all.
    #[error("Invalid token")]
    InvalidSignature,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Role not permitted for this resource")]
    RoleMismatch,

    #[error("Unknown login")]
    CredentialNotFound,

    #[error("Password does not match")]
    PasswordMismatch,

    /// The refresh token verified but is not the one currently on record.
    #[error("Refresh token is not current")]
    RefreshTokenMismatch,

    #[error("Password hashing failed: {0}")]
    HashFailure(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl AuthError {
    /// `true` for the two credential failures that must look identical to a
    /// caller.
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, AuthError::CredentialNotFound | AuthError::PasswordMismatch)
    }
}
