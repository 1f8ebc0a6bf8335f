//! [`UserStore`] backed by PostgreSQL.

use async_trait::async_trait;
use dispatch_core::types::UserId;
use dispatch_core::users::{Credential, NewUser, StoreError, User, UserStore};

use crate::repositories::UserRepo;
use crate::DbPool;

/// PostgreSQL error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a sqlx error onto the store taxonomy.
///
/// Unique violations on a `uq_` constraint become [`StoreError::Duplicate`];
/// everything else is a backend failure.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return StoreError::Duplicate(format!(
                    "value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, input: &NewUser) -> Result<UserId, StoreError> {
        UserRepo::create(
            &self.pool,
            &input.login,
            &input.password_hash,
            &input.username,
            input.role.as_str(),
        )
        .await
        .map_err(classify)
    }

    async fn find_credential_by_login(
        &self,
        login: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let row = UserRepo::find_credential_by_login(&self.pool, login)
            .await
            .map_err(classify)?;
        row.map(Credential::try_from)
            .transpose()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify)?;
        row.map(User::try_from)
            .transpose()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn delete_user_by_id(&self, id: UserId) -> Result<bool, StoreError> {
        UserRepo::delete(&self.pool, id).await.map_err(classify)
    }

    async fn store_refresh_hash(&self, id: UserId, hash: &str) -> Result<(), StoreError> {
        UserRepo::set_refresh_token_hash(&self.pool, id, hash)
            .await
            .map_err(classify)
    }

    async fn fetch_refresh_hash(&self, id: UserId) -> Result<Option<String>, StoreError> {
        UserRepo::get_refresh_token_hash(&self.pool, id)
            .await
            .map_err(classify)
    }
}
