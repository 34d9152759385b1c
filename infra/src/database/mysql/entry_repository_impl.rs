//! MySQL implementation of the EntryRepository trait.
//!
//! Active entries live in `entries`; a claim or expiry deletes the active row
//! and inserts the projection row in one transaction, so exactly one of the
//! three tables holds a given entry at any time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sk_core::domain::entities::entry::{ClaimedEntry, Entry, ExpiredEntry, NONCE_LENGTH};
use sk_core::errors::DomainError;
use sk_core::repositories::EntryRepository;

use super::{db_error, parse_uuid};

const ENTRY_COLUMNS: &str = "id, name, sent_by_user_id, sent_to_email, nonce, value, \
                             invalid_attempts, created_at, expires_at";

/// MySQL implementation of EntryRepository
#[derive(Clone)]
pub struct MySqlEntryRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlEntryRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &sqlx::mysql::MySqlRow) -> Result<Entry, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("Failed to get id"))?;
        let owner: String = row
            .try_get("sent_by_user_id")
            .map_err(db_error("Failed to get sent_by_user_id"))?;
        let nonce: Vec<u8> = row.try_get("nonce").map_err(db_error("Failed to get nonce"))?;

        let nonce: [u8; NONCE_LENGTH] = nonce.try_into().map_err(|bytes: Vec<u8>| DomainError::Internal {
            message: format!("Stored nonce has {} bytes, expected {}", bytes.len(), NONCE_LENGTH),
        })?;

        Ok(Entry {
            id: parse_uuid(&id, "entries.id")?,
            name: row.try_get("name").map_err(db_error("Failed to get name"))?,
            sent_by_user_id: parse_uuid(&owner, "entries.sent_by_user_id")?,
            sent_to_email: row
                .try_get("sent_to_email")
                .map_err(db_error("Failed to get sent_to_email"))?,
            nonce,
            value: row.try_get("value").map_err(db_error("Failed to get value"))?,
            invalid_attempts: row
                .try_get("invalid_attempts")
                .map_err(db_error("Failed to get invalid_attempts"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("Failed to get created_at"))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(db_error("Failed to get expires_at"))?,
        })
    }

    fn rows_to_entries(rows: &[sqlx::mysql::MySqlRow]) -> Result<Vec<Entry>, DomainError> {
        rows.iter().map(Self::row_to_entry).collect()
    }
}

#[async_trait]
impl EntryRepository for MySqlEntryRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Entry>, DomainError> {
        let query = format!("SELECT {} FROM entries WHERE id = ? LIMIT 1", ENTRY_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find entry"))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Entry>, DomainError> {
        let query = format!(
            "SELECT {} FROM entries WHERE sent_by_user_id = ? ORDER BY created_at ASC",
            ENTRY_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(owner_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list entries"))?;

        Self::rows_to_entries(&rows)
    }

    async fn create(&self, entry: &Entry) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO entries (
                id, name, sent_by_user_id, sent_to_email, nonce, value,
                invalid_attempts, created_at, expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(entry.id.to_string())
            .bind(&entry.name)
            .bind(entry.sent_by_user_id.to_string())
            .bind(&entry.sent_to_email)
            .bind(&entry.nonce[..])
            .bind(&entry.value)
            .bind(entry.invalid_attempts)
            .bind(entry.created_at)
            .bind(entry.expires_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to create entry"))?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete entry"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_invalid_attempts(&self, id: Uuid) -> Result<Option<u32>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let updated = sqlx::query("UPDATE entries SET invalid_attempts = invalid_attempts + 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to increment invalid attempts"))?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(db_error("Failed to roll back"))?;
            return Ok(None);
        }

        let row = sqlx::query("SELECT invalid_attempts FROM entries WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to read invalid attempts"))?;
        let attempts: u32 = row
            .try_get("invalid_attempts")
            .map_err(db_error("Failed to get invalid_attempts"))?;

        tx.commit().await.map_err(db_error("Failed to commit"))?;
        Ok(Some(attempts))
    }

    async fn record_claim(&self, claimed: &ClaimedEntry) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let deleted = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(claimed.entry_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to remove claimed entry"))?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await.map_err(db_error("Failed to roll back"))?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO claimed_entries (entry_id, name, sent_by_user_id, sent_to_email, claimed_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(claimed.entry_id.to_string())
        .bind(&claimed.name)
        .bind(claimed.sent_by_user_id.to_string())
        .bind(&claimed.sent_to_email)
        .bind(claimed.claimed_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to record claim"))?;

        tx.commit().await.map_err(db_error("Failed to commit claim"))?;
        Ok(true)
    }

    async fn record_expiry(&self, expired: &ExpiredEntry) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let deleted = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(expired.entry_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to remove expired entry"))?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await.map_err(db_error("Failed to roll back"))?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO expired_entries (
                entry_id, name, sent_by_user_id, sent_to_email, too_many_attempts, expired_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(expired.entry_id.to_string())
        .bind(&expired.name)
        .bind(expired.sent_by_user_id.to_string())
        .bind(&expired.sent_to_email)
        .bind(expired.too_many_attempts)
        .bind(expired.expired_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to record expiry"))?;

        tx.commit().await.map_err(db_error("Failed to commit expiry"))?;
        Ok(true)
    }

    async fn find_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Entry>, DomainError> {
        let query = format!(
            "SELECT {} FROM entries WHERE expires_at <= ? ORDER BY expires_at ASC LIMIT ?",
            ENTRY_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(now)
            .bind(limit as u64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to find expired entries"))?;

        Self::rows_to_entries(&rows)
    }
}
