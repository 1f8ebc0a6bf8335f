//! Handlers for `/admin/users` (admin only).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use dispatch_core::types::UserId;
use dispatch_core::users::User;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> AppResult<Json<User>> {
    let user = state.auth.find_user(id).await?;
    Ok(Json(user))
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> AppResult<StatusCode> {
    state.auth.delete_user(id).await?;
    tracing::info!(admin_id = %admin.user_id, user_id = %id, "Admin deleted user");
    Ok(StatusCode::NO_CONTENT)
}
