//! Rows from the `users` table.

use dispatch_core::roles::{Role, UnknownRole};
use dispatch_core::types::{Timestamp, UserId};
use dispatch_core::users::{Credential, User};
use sqlx::FromRow;

/// Public columns of a `users` row. Never selects `password_hash` or
/// `refresh_token_hash`.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: UserId,
    pub login: String,
    pub username: String,
    pub role: String,
    pub created_at: Timestamp,
}

/// Columns needed to check a password.
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRow {
    pub id: UserId,
    pub login: String,
    pub password_hash: String,
    pub role: String,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownRole;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            login: row.login,
            username: row.username,
            role: row.role.parse::<Role>()?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<CredentialRow> for Credential {
    type Error = UnknownRole;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(Credential {
            user_id: row.id,
            login: row.login,
            password_hash: row.password_hash,
            role: row.role.parse::<Role>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_credential_row_converts() {
        let id = Uuid::new_v4();
        let row = CredentialRow {
            id,
            login: "alice".into(),
            password_hash: "$argon2id$v=19$stub".into(),
            role: "Courier".into(),
        };

        let cred = Credential::try_from(row).expect("known role converts");
        assert_eq!(cred.user_id, id);
        assert_eq!(cred.role, Role::Courier);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let row = UserRow {
            id: Uuid::new_v4(),
            login: "bob".into(),
            username: "Bob".into(),
            role: "superuser".into(),
            created_at: chrono::Utc::now(),
        };

        assert_matches!(User::try_from(row), Err(UnknownRole(name)) if name == "superuser");
    }
}
