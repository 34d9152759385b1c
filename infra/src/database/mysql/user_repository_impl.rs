//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sk_core::domain::entities::user::User;
use sk_core::errors::{AuthError, DomainError};
use sk_core::repositories::UserRepository;

use super::{db_error, parse_uuid};

/// MySQL implementation of UserRepository
#[derive(Clone)]
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("Failed to get id"))?;

        Ok(User {
            id: parse_uuid(&id, "users.id")?,
            email: row.try_get("email").map_err(db_error("Failed to get email"))?,
            first_name: row
                .try_get("first_name")
                .map_err(db_error("Failed to get first_name"))?,
            last_name: row
                .try_get("last_name")
                .map_err(db_error("Failed to get last_name"))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(db_error("Failed to get password_hash"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("Failed to get created_at"))?,
        })
    }

    async fn find_one(&self, query: &str, value: String) -> Result<Option<User>, DomainError> {
        let result = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user"))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = r#"
            SELECT id, email, first_name, last_name, password_hash, created_at
            FROM users
            WHERE id = ?
            LIMIT 1
        "#;

        self.find_one(query, id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = r#"
            SELECT id, email, first_name, last_name, password_hash, created_at
            FROM users
            WHERE email = ?
            LIMIT 1
        "#;

        self.find_one(query, email.to_string()).await
    }

    async fn create(&self, user: &User) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO users (id, email, first_name, last_name, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuthError::UserAlreadyExists.into())
            }
            Err(e) => Err(db_error("Failed to create user")(e)),
        }
    }
}
