//! Bearer header parsing and the authenticated caller type.

use axum::http::HeaderValue;
use dispatch_core::roles::Role;
use dispatch_core::types::UserId;

use crate::auth::error::AuthError;

/// Case-sensitive authorization scheme literal.
pub const BEARER: &str = "Bearer";

/// Caller identity taken from verified token claims.
///
/// Use one of the role extractors in [`super::rbac`] to obtain it:
///
/// ```ignore
/// async fn my_handler(RequireClient(user): RequireClient) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Subject id from the verified `jti` claim.
    pub user_id: UserId,
    /// The verified role, always equal to the gate's required role.
    pub role: Role,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The value must split on single spaces into exactly two parts, the first
/// being literally `Bearer` and the second non-empty.
pub fn parse_bearer(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingHeader)?;
    if value.is_empty() {
        return Err(AuthError::MissingHeader);
    }
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}
