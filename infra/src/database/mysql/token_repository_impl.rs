//! MySQL implementation of the TokenRepository trait.
//!
//! Only SHA-256 hashes of refresh token values reach the database; hashing
//! happens in the token service before any call here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sk_core::domain::entities::token::RefreshToken;
use sk_core::errors::DomainError;
use sk_core::repositories::TokenRepository;

use super::{db_error, parse_uuid};

/// MySQL implementation of TokenRepository
#[derive(Clone)]
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("Failed to get id"))?;
        let user_id: String = row.try_get("user_id").map_err(db_error("Failed to get user_id"))?;

        Ok(RefreshToken {
            id: parse_uuid(&id, "refresh_tokens.id")?,
            user_id: parse_uuid(&user_id, "refresh_tokens.user_id")?,
            token_hash: row
                .try_get("token_hash")
                .map_err(db_error("Failed to get token_hash"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("Failed to get created_at"))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(db_error("Failed to get expires_at"))?,
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(token.created_at)
            .bind(token.expires_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to save refresh token"))?;

        Ok(())
    }

    async fn find_by_token_and_user(
        &self,
        token_hash: &str,
        user_id: Uuid,
    ) -> Result<Option<RefreshToken>, DomainError> {
        let query = r#"
            SELECT id, user_id, token_hash, created_at, expires_at
            FROM refresh_tokens
            WHERE token_hash = ? AND user_id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(token_hash)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find refresh token"))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_refresh_token(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete refresh token"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete expired tokens"))?;

        Ok(result.rows_affected() as usize)
    }
}
