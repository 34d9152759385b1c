//! Entry repository trait defining the interface for secret entry persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::entry::{ClaimedEntry, Entry, ExpiredEntry};
use crate::errors::DomainError;

/// Repository trait for active entries and their terminal projections
///
/// The engine relies on the store for every serialization guarantee:
///
/// * `increment_invalid_attempts` must increment and read back atomically so
///   concurrent wrong guesses cannot lose updates.
/// * `record_claim` and `record_expiry` must delete the active row and insert
///   the projection as one unit. Only the caller that actually removed the
///   active row may succeed; everyone else gets `Ok(false)` and no
///   projection is written.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Find an active entry by id
    ///
    /// # Returns
    /// * `Ok(Some(Entry))` - Entry is active
    /// * `Ok(None)` - No active entry with that id
    /// * `Err(DomainError)` - Store failure
    async fn find(&self, id: Uuid) -> Result<Option<Entry>, DomainError>;

    /// Find all active entries created by a user, oldest first
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Entry>, DomainError>;

    /// Persist a new active entry
    async fn create(&self, entry: &Entry) -> Result<(), DomainError>;

    /// Remove an active entry without leaving a projection
    ///
    /// # Returns
    /// * `Ok(true)` - Entry was deleted
    /// * `Ok(false)` - No active entry with that id
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Atomically add one invalid attempt and return the new count
    ///
    /// # Returns
    /// * `Ok(Some(count))` - Count after this increment
    /// * `Ok(None)` - Entry is no longer active
    async fn increment_invalid_attempts(&self, id: Uuid) -> Result<Option<u32>, DomainError>;

    /// Move an entry from active storage to the claimed projection
    ///
    /// # Returns
    /// * `Ok(true)` - This call performed the transition
    /// * `Ok(false)` - Entry was already gone; nothing was written
    async fn record_claim(&self, claimed: &ClaimedEntry) -> Result<bool, DomainError>;

    /// Move an entry from active storage to the expired projection
    ///
    /// Same contract as [`EntryRepository::record_claim`].
    async fn record_expiry(&self, expired: &ExpiredEntry) -> Result<bool, DomainError>;

    /// Find up to `limit` active entries whose deadline is at or before `now`
    async fn find_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Entry>, DomainError>;
}
