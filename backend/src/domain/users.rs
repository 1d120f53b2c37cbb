//! User lookup collaborator.
//!
//! Account management lives outside the engine; this store only answers the
//! questions the engine asks (does the user exist, who owns a board) plus a
//! `create_user` used for seeding and fixtures.
use crate::db::DbConnection;
use crate::domain::models::User;
use crate::errors::{DomainError, DomainResult};
use sqlx::Row;

#[derive(Clone)]
pub struct UserStore {
    db: DbConnection,
}

impl UserStore {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn user_exists(&self, user_id: &str) -> DomainResult<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    pub async fn get_user(&self, user_id: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT id, name, balance FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            name: r.get("name"),
            balance: r.get("balance"),
        }))
    }

    /// Fetch a user that is required to exist.
    pub async fn require_user(&self, user_id: &str) -> DomainResult<User> {
        self.get_user(user_id).await?.ok_or_else(|| {
            DomainError::ResourceNotFound(format!("user {} does not exist", user_id))
        })
    }

    pub async fn create_user(&self, id: &str, name: &str, balance: f64) -> DomainResult<User> {
        sqlx::query("INSERT INTO users (id, name, balance) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(balance)
            .execute(self.db.pool())
            .await?;

        Ok(User {
            id: id.to_string(),
            name: name.to_string(),
            balance,
        })
    }
}
