//! Handlers for the `/auth` resource (signup, login, refresh, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dispatch_core::error::CoreError;
use dispatch_core::roles::Role;
use dispatch_core::types::UserId;
use dispatch_core::users::User;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::TokenPair;
use crate::auth::service::SignUp;
use crate::error::AppResult;
use crate::middleware::auth::BEARER;
use crate::middleware::rbac::RequireClient;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub login: String,
    pub password: String,
    pub username: String,
    /// One of `Admin`, `Manager`, `Client`, `Courier`.
    pub role: String,
}

/// Response body for `POST /auth/signup`.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: UserId,
    pub message: &'static str,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl TokenResponse {
    fn new(pair: TokenPair, expires_in: i64) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: BEARER,
            expires_in,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create a user with the given role. Returns 201 with the new id.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let role: Role = input
        .role
        .parse()
        .map_err(|e: dispatch_core::roles::UnknownRole| CoreError::Validation(e.to_string()))?;

    let id = state
        .auth
        .sign_up(SignUp {
            login: input.login,
            password: input.password,
            username: input.username,
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id,
            message: "User created",
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with login + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state.auth.login(&input.login, &input.password).await?;
    Ok(Json(TokenResponse::new(
        pair,
        state.auth.issuer().access_ttl_secs(),
    )))
}

/// POST /api/v1/auth/refresh
///
/// Exchange the current refresh token for a new pair (rotation).
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state.auth.refresh(&input.refresh_token).await?;
    Ok(Json(TokenResponse::new(
        pair,
        state.auth.issuer().access_ttl_secs(),
    )))
}

/// GET /api/v1/auth/me
///
/// Personal info of the calling client.
pub async fn me(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
) -> AppResult<Json<User>> {
    let info = state.auth.find_user(user.user_id).await?;
    Ok(Json(info))
}

/// DELETE /api/v1/auth/me
///
/// Delete the calling client's account. Returns 204 No Content.
pub async fn delete_me(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
) -> AppResult<StatusCode> {
    state.auth.delete_user(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
