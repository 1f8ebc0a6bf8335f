//! Signed token issuance and validation.
//!
//! Both tokens of a pair are HS256-signed JWTs under one process-wide
//! secret and carry the same `jti` (the user id) and `sid` (a fresh id per
//! issuance, so no two pairs are alike). The access token adds a
//! `role` claim and lives for `JWT_ACCESS_TTL_HOURS`; the refresh token has
//! no role and lives for `JWT_REFRESH_TTL_HOURS`.

use std::fmt;

use chrono::Utc;
use dispatch_core::roles::Role;
use dispatch_core::types::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::claims::{self, TokenClaims, VerifiedClaims};
use super::error::AuthError;
use crate::config::{env_or, ConfigError};

/// Default access token lifetime in hours.
const DEFAULT_ACCESS_TTL_HOURS: i64 = 24;
/// Default refresh token lifetime in hours.
const DEFAULT_REFRESH_TTL_HOURS: i64 = 72;
/// Upper bound for either lifetime: one year.
const MAX_TTL_HOURS: i64 = 24 * 366;

/// Configuration for token generation and validation.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in hours (default: 24).
    pub access_token_ttl_hours: i64,
    /// Refresh token lifetime in hours (default: 72).
    pub refresh_token_ttl_hours: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl_hours", &self.access_token_ttl_hours)
            .field("refresh_token_ttl_hours", &self.refresh_token_ttl_hours)
            .finish()
    }
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `JWT_SECRET`            | **yes**  | --      |
    /// | `JWT_ACCESS_TTL_HOURS`  | no       | `24`    |
    /// | `JWT_REFRESH_TTL_HOURS` | no       | `72`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if secret.is_empty() {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET",
                reason: "must not be empty".into(),
            });
        }

        let access_token_ttl_hours: i64 = env_or("JWT_ACCESS_TTL_HOURS", DEFAULT_ACCESS_TTL_HOURS)?;
        let refresh_token_ttl_hours: i64 =
            env_or("JWT_REFRESH_TTL_HOURS", DEFAULT_REFRESH_TTL_HOURS)?;

        Self::new(secret, access_token_ttl_hours, refresh_token_ttl_hours)
    }

    /// Build a checked configuration.
    ///
    /// Both lifetimes must lie in `1..=MAX_TTL_HOURS` and the refresh
    /// lifetime must exceed the access lifetime.
    pub fn new(
        secret: String,
        access_token_ttl_hours: i64,
        refresh_token_ttl_hours: i64,
    ) -> Result<Self, ConfigError> {
        for (var, hours) in [
            ("JWT_ACCESS_TTL_HOURS", access_token_ttl_hours),
            ("JWT_REFRESH_TTL_HOURS", refresh_token_ttl_hours),
        ] {
            if !(1..=MAX_TTL_HOURS).contains(&hours) {
                return Err(ConfigError::Invalid {
                    var,
                    reason: format!("must be between 1 and {MAX_TTL_HOURS} hours"),
                });
            }
        }
        if access_token_ttl_hours >= refresh_token_ttl_hours {
            return Err(ConfigError::Invalid {
                var: "JWT_REFRESH_TTL_HOURS",
                reason: "refresh lifetime must exceed access lifetime".into(),
            });
        }

        Ok(Self {
            secret,
            access_token_ttl_hours,
            refresh_token_ttl_hours,
        })
    }
}

/// Access + refresh tokens issued together for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and validates tokens with one signing secret.
///
/// Built once at startup from [`JwtConfig`] and shared via `Arc`.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: no grace period past `exp`.
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl_secs: config.access_token_ttl_hours.saturating_mul(3600),
            refresh_ttl_secs: config.refresh_token_ttl_hours.saturating_mul(3600),
        }
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Issue an access/refresh pair for `user_id`.
    ///
    /// Both tokens share one `iat`, one `jti` and one freshly generated
    /// `sid`; only the access token carries `role`.
    pub fn issue(&self, role: Role, user_id: UserId) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();
        let subject = user_id.to_string();
        let sid = Uuid::new_v4();

        let access = TokenClaims {
            role: Some(role),
            jti: subject.clone(),
            sid,
            iat: now,
            exp: now.saturating_add(self.access_ttl_secs),
        };
        let refresh = TokenClaims {
            role: None,
            jti: subject,
            sid,
            iat: now,
            exp: now.saturating_add(self.refresh_ttl_secs),
        };

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
        })
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature, algorithm and expiry, then decode the claims.
    ///
    /// Expiry maps to [`AuthError::ExpiredToken`]; every other failure
    /// (bad MAC, wrong algorithm, malformed segments or payload) maps to
    /// [`AuthError::InvalidSignature`].
    pub fn validate(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidSignature,
            },
        )?;
        claims::extract(data.claims)
    }

    /// Check that both tokens of a pair validate and came from one issuance.
    pub fn correlate(&self, pair: &TokenPair) -> Result<bool, AuthError> {
        let access = self.validate(&pair.access_token)?;
        let refresh = self.validate(&pair.refresh_token)?;
        Ok(access.subject_id() == refresh.subject_id()
            && access.session_id() == refresh.session_id())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;

    fn test_config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_ttl_hours: 24,
            refresh_token_ttl_hours: 72,
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&test_config("test-secret-that-is-long-enough-for-hmac"))
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        for role in Role::ALL {
            let pair = issuer.issue(role, user_id).expect("issue should succeed");

            let claims = issuer
                .validate(&pair.access_token)
                .expect("access token should validate");
            assert_eq!(claims.role(), Some(role));
            assert_eq!(claims.subject_id(), user_id);
            assert_eq!(claims.expires_at() - claims.issued_at(), 24 * 3600);
        }
    }

    #[test]
    fn test_pair_shares_subject_and_refresh_has_no_role() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let pair = issuer.issue(Role::Courier, user_id).unwrap();

        let access = issuer.validate(&pair.access_token).unwrap();
        let refresh = issuer.validate(&pair.refresh_token).unwrap();
        assert_eq!(access.subject_id(), refresh.subject_id());
        assert_eq!(refresh.role(), None);
        assert_eq!(refresh.expires_at() - refresh.issued_at(), 72 * 3600);
        assert!(refresh.expires_at() > access.expires_at());

        assert!(issuer.correlate(&pair).unwrap());
    }

    #[test]
    fn test_correlate_detects_mixed_pairs() {
        let issuer = issuer();
        let a = issuer.issue(Role::Client, Uuid::new_v4()).unwrap();
        let b = issuer.issue(Role::Client, Uuid::new_v4()).unwrap();

        let mixed = TokenPair {
            access_token: a.access_token,
            refresh_token: b.refresh_token,
        };
        assert!(!issuer.correlate(&mixed).unwrap());
    }

    #[test]
    fn test_different_secret_fails_with_invalid_signature() {
        let issuer_a = TokenIssuer::new(&test_config("secret-alpha"));
        let issuer_b = TokenIssuer::new(&test_config("secret-bravo"));

        let pair = issuer_a.issue(Role::Admin, Uuid::new_v4()).unwrap();
        assert_matches!(
            issuer_b.validate(&pair.access_token),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_spliced_signature_fails() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let admin = issuer.issue(Role::Admin, user_id).unwrap().access_token;
        let client = issuer.issue(Role::Client, user_id).unwrap().access_token;

        // Admin header+payload with the client token's MAC.
        let (admin_body, _) = admin.rsplit_once('.').unwrap();
        let (_, client_sig) = client.rsplit_once('.').unwrap();
        let forged = format!("{admin_body}.{client_sig}");

        assert_matches!(issuer.validate(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let config = test_config("shared-secret");
        let issuer = TokenIssuer::new(&config);
        let claims = TokenClaims {
            role: Some(Role::Admin),
            jti: Uuid::new_v4().to_string(),
            sid: Uuid::new_v4(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert_matches!(issuer.validate(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_fails_even_with_valid_signature() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            role: Some(Role::Client),
            jti: Uuid::new_v4().to_string(),
            sid: Uuid::new_v4(),
            iat: now - 600,
            exp: now - 1,
        };
        let token = issuer.sign(&claims).unwrap();

        assert_matches!(issuer.validate(&token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let issuer = issuer();
        assert_matches!(
            issuer.validate("invalid.token.here"),
            Err(AuthError::InvalidSignature)
        );
        assert_matches!(issuer.validate(""), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_every_issuance_is_distinct() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let first = issuer.issue(Role::Client, user_id).unwrap();
        let second = issuer.issue(Role::Client, user_id).unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);

        let a = issuer.validate(&first.refresh_token).unwrap();
        let b = issuer.validate(&second.refresh_token).unwrap();
        assert_eq!(a.subject_id(), b.subject_id());
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_correlate_rejects_pairs_from_different_issuances() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let first = issuer.issue(Role::Client, user_id).unwrap();
        let second = issuer.issue(Role::Client, user_id).unwrap();

        let crossed = TokenPair {
            access_token: first.access_token,
            refresh_token: second.refresh_token,
        };
        assert!(!issuer.correlate(&crossed).unwrap());
    }

    #[test]
    fn test_config_bounds_lifetimes() {
        assert!(JwtConfig::new("s".into(), 24, 72).is_ok());
        assert_matches!(
            JwtConfig::new("s".into(), 0, 72),
            Err(ConfigError::Invalid { var: "JWT_ACCESS_TTL_HOURS", .. })
        );
        assert_matches!(
            JwtConfig::new("s".into(), 24, i64::MAX),
            Err(ConfigError::Invalid { var: "JWT_REFRESH_TTL_HOURS", .. })
        );
        assert_matches!(
            JwtConfig::new("s".into(), 72, 24),
            Err(ConfigError::Invalid { var: "JWT_REFRESH_TTL_HOURS", .. })
        );
    }

    #[test]
    fn test_huge_lifetime_does_not_overflow() {
        let issuer = TokenIssuer::new(&JwtConfig {
            secret: "s".into(),
            access_token_ttl_hours: i64::MAX,
            refresh_token_ttl_hours: i64::MAX,
        });
        assert_eq!(issuer.access_ttl_secs(), i64::MAX);
        assert!(issuer.issue(Role::Admin, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", test_config("super-secret-value"));
        assert!(!rendered.contains("super-secret-value"));
    }
}
