//! Repository for the `users` table.

use dispatch_core::types::UserId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{CredentialRow, UserRow};

/// Public column list shared across queries.
const COLUMNS: &str = "id, login, username, role, created_at";

/// Provides the user queries the auth layer needs.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with a freshly generated id, returning the id.
    pub async fn create(
        pool: &PgPool,
        login: &str,
        password_hash: &str,
        username: &str,
        role: &str,
    ) -> Result<UserId, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, login, password_hash, username, role)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(login)
        .bind(password_hash)
        .bind(username)
        .bind(role)
        .execute(pool)
        .await?;
        Ok(id)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the credential columns for a login (case-sensitive).
    pub async fn find_credential_by_login(
        pool: &PgPool,
        login: &str,
    ) -> Result<Option<CredentialRow>, sqlx::Error> {
        sqlx::query_as::<_, CredentialRow>(
            "SELECT id, login, password_hash, role FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(pool)
        .await
    }

    /// Hard-delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: UserId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the stored refresh-token hash.
    pub async fn set_refresh_token_hash(
        pool: &PgPool,
        id: UserId,
        hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET refresh_token_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn get_refresh_token_hash(
        pool: &PgPool,
        id: UserId,
    ) -> Result<Option<String>, sqlx::Error> {
        let hash: Option<Option<String>> =
            sqlx::query_scalar("SELECT refresh_token_hash FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(hash.flatten())
    }
}
