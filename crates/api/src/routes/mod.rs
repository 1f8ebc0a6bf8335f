pub mod admin;
pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                 create user (public)
/// /auth/login                  login (public)
/// /auth/refresh                rotate token pair (public)
/// /auth/me                     get, delete own account (Client)
///
/// /admin/users/{id}            get, delete (Admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}
