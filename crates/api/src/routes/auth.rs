//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /signup   -> signup
/// POST   /login    -> login
/// POST   /refresh  -> refresh
/// GET    /me       -> me (Client)
/// DELETE /me       -> delete_me (Client)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/me", get(auth::me).delete(auth::delete_me))
}
