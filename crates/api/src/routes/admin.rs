//! Route definitions for `/admin`.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the `Admin` role.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/users/{id}",
        get(admin::get_user).delete(admin::delete_user),
    )
}
