use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dispatch_core::error::CoreError;
use serde_json::json;

use crate::auth::error::AuthError;

/// Message returned for both unknown logins and wrong passwords.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid login or password";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`AuthError`] for
/// authentication/authorization failures, and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `dispatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A credential, token or role-gate failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal(detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map an [`AuthError`] to status, machine code and client-safe message.
fn classify_auth_error(err: &AuthError) -> (StatusCode, &'static str, String) {
    let unauthorized = |code| (StatusCode::UNAUTHORIZED, code, err.to_string());
    match err {
        AuthError::MissingHeader => unauthorized("MISSING_HEADER"),
        AuthError::MalformedHeader => unauthorized("MALFORMED_HEADER"),
        AuthError::InvalidSignature => unauthorized("INVALID_TOKEN"),
        AuthError::ExpiredToken => unauthorized("TOKEN_EXPIRED"),
        AuthError::RefreshTokenMismatch => unauthorized("INVALID_REFRESH_TOKEN"),
        AuthError::RoleMismatch => (StatusCode::FORBIDDEN, "ROLE_MISMATCH", err.to_string()),
        AuthError::CredentialNotFound | AuthError::PasswordMismatch => (
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            INVALID_CREDENTIALS_MESSAGE.to_string(),
        ),
        AuthError::HashFailure(detail)
        | AuthError::Signing(detail)
        | AuthError::PersistenceFailure(detail) => internal(detail),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            // --- Auth errors ---
            AppError::Auth(auth) => classify_auth_error(auth),

            // --- HTTP-specific errors ---
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
