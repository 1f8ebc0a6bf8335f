use std::sync::Arc;
use std::time::Duration;

use dispatch_core::users::UserStore;

use crate::auth::jwt::TokenIssuer;
use crate::auth::service::AuthService;
use crate::config::ServerConfig;
use crate::middleware::rbac::RoleGates;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Signup, login, refresh and account flows.
    pub auth: Arc<AuthService>,
    /// One role gate per role, used by the `Require*` extractors.
    pub gates: Arc<RoleGates>,
}

impl AppState {
    /// Wire the auth components around `store`.
    ///
    /// A single [`TokenIssuer`] is built from `config.jwt` and shared by the
    /// service and every gate, so tokens issued at login verify at the gates.
    pub fn new(config: ServerConfig, store: Arc<dyn UserStore>) -> Self {
        let issuer = Arc::new(TokenIssuer::new(&config.jwt));
        let auth = AuthService::new(
            store,
            Arc::clone(&issuer),
            Duration::from_secs(config.store_timeout_secs),
            config.password_min_length,
        );

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            gates: Arc::new(RoleGates::new(issuer)),
        }
    }
}
