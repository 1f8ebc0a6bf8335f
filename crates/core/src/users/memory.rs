//! In-process [`UserStore`] backed by a `HashMap`.
//!
//! Used by the HTTP integration tests and handy for local experiments; it
//! enforces the same unique-login rule as the `users` table.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Credential, NewUser, StoreError, User, UserStore};
use crate::types::{Timestamp, UserId};

#[derive(Debug, Clone)]
struct Row {
    login: String,
    password_hash: String,
    username: String,
    role: crate::roles::Role,
    refresh_token_hash: Option<String>,
    created_at: Timestamp,
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    rows: RwLock<HashMap<UserId, Row>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_user(&self, input: &NewUser) -> Result<UserId, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|row| row.login == input.login) {
            return Err(StoreError::Duplicate(format!(
                "login {:?} is already taken",
                input.login
            )));
        }

        let id = Uuid::new_v4();
        rows.insert(
            id,
            Row {
                login: input.login.clone(),
                password_hash: input.password_hash.clone(),
                username: input.username.clone(),
                role: input.role,
                refresh_token_hash: None,
                created_at: chrono::Utc::now(),
            },
        );
        Ok(id)
    }

    async fn find_credential_by_login(
        &self,
        login: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|(_, row)| row.login == login)
            .map(|(id, row)| Credential {
                user_id: *id,
                login: row.login.clone(),
                password_hash: row.password_hash.clone(),
                role: row.role,
            }))
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).map(|row| User {
            id,
            login: row.login.clone(),
            username: row.username.clone(),
            role: row.role,
            created_at: row.created_at,
        }))
    }

    async fn delete_user_by_id(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn store_refresh_hash(&self, id: UserId, hash: &str) -> Result<(), StoreError> {
        // Matches `UPDATE ... WHERE id = $1`: a missing user is a no-op.
        if let Some(row) = self.rows.write().await.get_mut(&id) {
            row.refresh_token_hash = Some(hash.to_string());
        }
        Ok(())
    }

    async fn fetch_refresh_hash(&self, id: UserId) -> Result<Option<String>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).and_then(|row| row.refresh_token_hash.clone()))
    }
}
