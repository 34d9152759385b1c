//! In-memory implementation of EntryRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::entry::{ClaimedEntry, Entry, ExpiredEntry};
use crate::errors::DomainError;

use super::r#trait::EntryRepository;

#[derive(Default)]
struct Tables {
    active: HashMap<Uuid, Entry>,
    claimed: HashMap<Uuid, ClaimedEntry>,
    expired: HashMap<Uuid, ExpiredEntry>,
}

/// Mock entry repository for testing
///
/// All three tables share one lock, so transitions are as atomic as the
/// MySQL transactions they stand in for.
#[derive(Clone, Default)]
pub struct MockEntryRepository {
    tables: Arc<RwLock<Tables>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockEntryRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with an internal error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Move an active entry's deadline, e.g. into the past
    pub async fn set_expires_at(&self, id: Uuid, expires_at: DateTime<Utc>) -> bool {
        let mut tables = self.tables.write().await;
        match tables.active.get_mut(&id) {
            Some(entry) => {
                entry.expires_at = expires_at;
                true
            }
            None => false,
        }
    }

    /// Active entry as currently stored
    pub async fn active_entry(&self, id: Uuid) -> Option<Entry> {
        self.tables.read().await.active.get(&id).cloned()
    }

    pub async fn claimed_entry(&self, id: Uuid) -> Option<ClaimedEntry> {
        self.tables.read().await.claimed.get(&id).cloned()
    }

    pub async fn expired_entry(&self, id: Uuid) -> Option<ExpiredEntry> {
        self.tables.read().await.expired.get(&id).cloned()
    }

    /// Number of rows in the active, claimed and expired tables
    pub async fn table_sizes(&self) -> (usize, usize, usize) {
        let tables = self.tables.read().await;
        (tables.active.len(), tables.claimed.len(), tables.expired.len())
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::internal("simulated store failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl EntryRepository for MockEntryRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Entry>, DomainError> {
        Ok(self.tables.read().await.active.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Entry>, DomainError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<Entry> = tables
            .active
            .values()
            .filter(|e| e.sent_by_user_id == owner_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn create(&self, entry: &Entry) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        if tables.active.contains_key(&entry.id) {
            return Err(DomainError::internal("Duplicate entry id"));
        }

        tables.active.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        self.check_writable()?;
        Ok(self.tables.write().await.active.remove(&id).is_some())
    }

    async fn increment_invalid_attempts(&self, id: Uuid) -> Result<Option<u32>, DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        Ok(tables.active.get_mut(&id).map(|entry| {
            entry.invalid_attempts += 1;
            entry.invalid_attempts
        }))
    }

    async fn record_claim(&self, claimed: &ClaimedEntry) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        if tables.active.remove(&claimed.entry_id).is_none() {
            return Ok(false);
        }
        tables.claimed.insert(claimed.entry_id, claimed.clone());
        Ok(true)
    }

    async fn record_expiry(&self, expired: &ExpiredEntry) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        if tables.active.remove(&expired.entry_id).is_none() {
            return Ok(false);
        }
        tables.expired.insert(expired.entry_id, expired.clone());
        Ok(true)
    }

    async fn find_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Entry>, DomainError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<Entry> = tables
            .active
            .values()
            .filter(|e| e.is_expired_at(now))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.expires_at);
        entries.truncate(limit);
        Ok(entries)
    }
}
