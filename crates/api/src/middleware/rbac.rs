//! Role-based access control (RBAC).
//!
//! A [`RoleGate`] is built once per role with the shared [`TokenIssuer`] and
//! runs every request through the same pipeline:
//!
//! ```text
//! Unauthenticated -> HeaderParsed -> SignatureVerified -> RoleVerified -> Authorized
//!        \________________\__________________\_______________\____> Rejected(reason)
//! ```
//!
//! The per-role extractors ([`RequireAdmin`], [`RequireManager`],
//! [`RequireClient`], [`RequireCourier`]) differ only in which gate they
//! look up in [`RoleGates`].

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use dispatch_core::roles::Role;

use super::auth::{parse_bearer, AuthUser};
use crate::auth::claims::{peek_subject, VerifiedClaims};
use crate::auth::error::AuthError;
use crate::auth::jwt::TokenIssuer;
use crate::error::AppError;
use crate::state::AppState;

/// Where in the pipeline a request was when it was rejected.
#[derive(Debug, Clone, Copy)]
enum GateStage {
    Unauthenticated,
    HeaderParsed,
    SignatureVerified,
}

enum GateState<'a> {
    Unauthenticated(Option<&'a HeaderValue>),
    HeaderParsed(&'a str),
    SignatureVerified(VerifiedClaims),
    RoleVerified(VerifiedClaims),
    Authorized(AuthUser),
    Rejected { stage: GateStage, reason: AuthError },
}

/// Authorizes requests for exactly one role.
#[derive(Clone)]
pub struct RoleGate {
    required: Role,
    issuer: Arc<TokenIssuer>,
}

impl RoleGate {
    pub fn new(required: Role, issuer: Arc<TokenIssuer>) -> Self {
        Self { required, issuer }
    }

    pub fn required_role(&self) -> Role {
        self.required
    }

    /// Run the authorization pipeline over an `Authorization` header value.
    ///
    /// Each step either advances or rejects; there is no retry.
    pub fn authorize(&self, header: Option<&HeaderValue>) -> Result<AuthUser, AuthError> {
        let mut state = GateState::Unauthenticated(header);
        loop {
            state = match state {
                GateState::Unauthenticated(header) => match parse_bearer(header) {
                    Ok(token) => GateState::HeaderParsed(token),
                    Err(reason) => GateState::Rejected {
                        stage: GateStage::Unauthenticated,
                        reason,
                    },
                },
                GateState::HeaderParsed(token) => match self.issuer.validate(token) {
                    Ok(claims) => GateState::SignatureVerified(claims),
                    Err(reason) => {
                        // Unverified, for log context only.
                        if let Some(claimed) = peek_subject(token) {
                            tracing::debug!(claimed_subject = %claimed, reason = %reason, "Token failed verification");
                        }
                        GateState::Rejected {
                            stage: GateStage::HeaderParsed,
                            reason,
                        }
                    }
                },
                GateState::SignatureVerified(claims) => {
                    if claims.role() == Some(self.required) {
                        GateState::RoleVerified(claims)
                    } else {
                        GateState::Rejected {
                            stage: GateStage::SignatureVerified,
                            reason: AuthError::RoleMismatch,
                        }
                    }
                }
                GateState::RoleVerified(claims) => GateState::Authorized(AuthUser {
                    user_id: claims.subject_id(),
                    role: self.required,
                }),
                GateState::Authorized(user) => return Ok(user),
                GateState::Rejected { stage, reason } => {
                    tracing::debug!(
                        required = %self.required,
                        stage = ?stage,
                        reason = %reason,
                        "Request rejected by role gate"
                    );
                    return Err(reason);
                }
            };
        }
    }
}

/// One gate per role, sharing a single issuer.
#[derive(Clone)]
pub struct RoleGates {
    admin: RoleGate,
    manager: RoleGate,
    client: RoleGate,
    courier: RoleGate,
}

impl RoleGates {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self {
            admin: RoleGate::new(Role::Admin, Arc::clone(&issuer)),
            manager: RoleGate::new(Role::Manager, Arc::clone(&issuer)),
            client: RoleGate::new(Role::Client, Arc::clone(&issuer)),
            courier: RoleGate::new(Role::Courier, issuer),
        }
    }

    pub fn get(&self, role: Role) -> &RoleGate {
        match role {
            Role::Admin => &self.admin,
            Role::Manager => &self.manager,
            Role::Client => &self.client,
            Role::Courier => &self.courier,
        }
    }
}

/// Declare an extractor that admits only callers holding `$role`.
macro_rules! role_extractor {
    ($(#[$doc:meta])* $name:ident, $role:expr) => {
        $(#[$doc])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = state
                    .gates
                    .get($role)
                    .authorize(parts.headers.get(AUTHORIZATION))?;
                Ok($name(user))
            }
        }
    };
}

role_extractor!(
    /// Requires the `Admin` role.
    ///
    /// ```ignore
    /// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
    ///     Ok(Json(()))
    /// }
    /// ```
    RequireAdmin,
    Role::Admin
);
role_extractor!(
    /// Requires the `Manager` role.
    RequireManager,
    Role::Manager
);
role_extractor!(
    /// Requires the `Client` role.
    RequireClient,
    Role::Client
);
role_extractor!(
    /// Requires the `Courier` role.
    RequireCourier,
    Role::Courier
);
