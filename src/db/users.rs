//! `users` table.

use crate::error::{Error, Result};
use crate::model::{User, UserId};
use crate::repo::UserRepository;
use async_trait::async_trait;

const USER_COLUMNS: &str = "id, username, email, password, created_at";

#[async_trait]
impl UserRepository for super::Db {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn save(&self, user: User) -> Result<User> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE
             SET username = EXCLUDED.username, email = EXCLUDED.email, password = EXCLUDED.password",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.created_at)
        .execute(self.pool())
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: User) -> Result<User> {
        let inserted = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (username) DO NOTHING
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.created_at)
        .fetch_optional(self.pool())
        .await?;
        inserted.ok_or_else(|| Error::Conflict(format!("username {} is taken", user.username)))
    }
}
