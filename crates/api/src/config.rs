use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Problem with an environment variable at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Read `var`, falling back to `default` when unset.
pub(crate) fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Server configuration loaded from environment variables.
///
/// Loaded once in `main` and shared through `AppState`; nothing re-reads
/// the environment per request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Deadline for a single user-store call in seconds (default: `5`).
    pub store_timeout_secs: u64,
    /// Minimum password length accepted at signup (default: `6`).
    pub password_min_length: usize,
    /// JWT configuration (secret, token lifetimes).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `STORE_TIMEOUT_SECS`   | `5`                        |
    /// | `PASSWORD_MIN_LENGTH`  | `6`                        |
    ///
    /// See [`JwtConfig::from_env`] for the token variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 8080)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30)?;
        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", 30)?;
        let store_timeout_secs: u64 = env_or("STORE_TIMEOUT_SECS", 5)?;
        if store_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "STORE_TIMEOUT_SECS",
                reason: "must be at least 1".into(),
            });
        }
        let password_min_length: usize = env_or("PASSWORD_MIN_LENGTH", 6)?;

        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            store_timeout_secs,
            password_min_length,
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // Each test uses its own variable name so parallel tests do not collide.

    #[test]
    fn test_env_or_uses_default_when_unset() {
        let value: u64 = env_or("DISPATCH_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_env_or_parses_value() {
        std::env::set_var("DISPATCH_TEST_PARSED_VAR", " 17 ");
        let value: u16 = env_or("DISPATCH_TEST_PARSED_VAR", 1).unwrap();
        assert_eq!(value, 17);
    }

    #[test]
    fn test_env_or_rejects_garbage() {
        std::env::set_var("DISPATCH_TEST_GARBAGE_VAR", "eighty");
        let result: Result<u16, _> = env_or("DISPATCH_TEST_GARBAGE_VAR", 1);
        assert_matches!(
            result,
            Err(ConfigError::Invalid { var: "DISPATCH_TEST_GARBAGE_VAR", .. })
        );
    }
}
