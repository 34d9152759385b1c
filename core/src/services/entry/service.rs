//! Entry lifecycle service: create, look up, reveal and expire secret entries

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::entry::{Entry, ExpiryReason, NONCE_LENGTH};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::EntryRepository;
use crate::services::random::{OsRandomSource, RandomSource};

use super::cipher::EntryCipher;
use super::config::EntryServiceConfig;
use super::notifier::EntryNotifier;

/// User-facing messages produced by the entry service
pub mod messages {
    pub const SENDER_REQUIRED: &str = "A sender ID is required.";
    pub const NAME_REQUIRED: &str = "A name is required.";
    pub const RECIPIENT_REQUIRED: &str = "A recipient email is required.";
    pub const VALUE_REQUIRED: &str = "A value is required.";
    pub const SECRET_REQUIRED: &str = "A secret is required.";
    pub const DURATION_POSITIVE: &str = "Duration must be greater than 0.";
    pub const INVALID_ENTRY: &str = "Invalid entry ID.";
    pub const INVALID_SECRET: &str = "Invalid secret.";
    pub const TOO_MANY_ATTEMPTS: &str =
        "Too many attempts have been made, and the entry has been expired.";

    pub fn value_too_large(max_bytes: usize) -> String {
        format!("The value must not exceed {} bytes.", max_bytes)
    }
}

/// Input for [`EntryService::create_entry`]
#[derive(Clone)]
pub struct CreateEntryRequest {
    pub name: String,
    pub sent_by_user_id: Uuid,
    pub sent_to_email: String,
    pub value: String,
    pub secret: String,
    pub duration: Duration,
}

/// Result of a reveal attempt
#[derive(Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Correct phrase; the entry has been claimed and is gone
    Revealed { value: Vec<u8> },
    /// No such entry, wrong nonce, or already expired/claimed
    InvalidEntry,
    /// Wrong phrase; `expired` when this guess used up the last attempt
    InvalidSecret { expired: bool },
}

impl RevealOutcome {
    pub fn is_revealed(&self) -> bool {
        matches!(self, RevealOutcome::Revealed { .. })
    }

    /// Whether the entry was expired by this attempt
    pub fn is_expired(&self) -> bool {
        matches!(self, RevealOutcome::InvalidSecret { expired: true })
    }

    /// Messages describing a failed reveal; empty on success
    pub fn errors(&self) -> Vec<&'static str> {
        match self {
            RevealOutcome::Revealed { .. } => Vec::new(),
            RevealOutcome::InvalidEntry => vec![messages::INVALID_ENTRY],
            RevealOutcome::InvalidSecret { expired: false } => vec![messages::INVALID_SECRET],
            RevealOutcome::InvalidSecret { expired: true } => {
                vec![messages::INVALID_SECRET, messages::TOO_MANY_ATTEMPTS]
            }
        }
    }
}

impl std::fmt::Debug for RevealOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevealOutcome::Revealed { value } => f
                .debug_struct("Revealed")
                .field("value_len", &value.len())
                .finish(),
            RevealOutcome::InvalidEntry => f.write_str("InvalidEntry"),
            RevealOutcome::InvalidSecret { expired } => f
                .debug_struct("InvalidSecret")
                .field("expired", expired)
                .finish(),
        }
    }
}

/// Service owning every transition of a secret entry.
///
/// Holds no mutable state; all serialization happens in the repository.
pub struct EntryService<R: EntryRepository, N: EntryNotifier> {
    repository: R,
    notifier: N,
    cipher: EntryCipher,
    config: EntryServiceConfig,
    random: Arc<dyn RandomSource>,
}

impl<R: EntryRepository, N: EntryNotifier> EntryService<R, N> {
    /// Creates a new entry service using the operating system RNG
    pub fn new(repository: R, notifier: N, config: EntryServiceConfig) -> Self {
        Self::with_random_source(repository, notifier, config, Arc::new(OsRandomSource))
    }

    /// Creates a new entry service with an explicit randomness source
    pub fn with_random_source(
        repository: R,
        notifier: N,
        config: EntryServiceConfig,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let cipher = EntryCipher::new(config.encryption_key.clone());
        Self {
            repository,
            notifier,
            cipher,
            config,
            random,
        }
    }

    /// Access the underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Maximum wrong guesses before expiry
    pub fn max_invalid_attempts(&self) -> u32 {
        self.config.max_invalid_attempts
    }

    /// Validates, encrypts and stores a new entry, then notifies the recipient.
    ///
    /// # Errors
    ///
    /// * `DomainError::Validation` listing every violated rule; nothing is stored
    /// * `DomainError::Internal` if storage or notification fails. An entry
    ///   whose notification failed is deleted again before returning.
    pub async fn create_entry(&self, request: CreateEntryRequest) -> DomainResult<Entry> {
        self.validate(&request)?;

        let mut nonce = [0u8; NONCE_LENGTH];
        self.random.fill_bytes(&mut nonce);

        let value = self
            .cipher
            .seal(request.value.as_bytes(), &nonce, &request.secret)?;

        let entry = Entry::new(
            request.name,
            request.sent_by_user_id,
            request.sent_to_email.trim().to_string(),
            nonce,
            value,
            Utc::now(),
            request.duration,
        );

        self.repository.create(&entry).await?;
        info!(entry_id = %entry.id, sender = %entry.sent_by_user_id, "Entry created");

        if let Err(e) = self.notifier.notify_recipient(&entry, &entry.nonce_hex()).await {
            warn!(entry_id = %entry.id, error = %e, "Recipient notification failed, removing entry");
            if let Err(delete_err) = self.repository.delete(entry.id).await {
                error!(entry_id = %entry.id, error = %delete_err, "Failed to remove undelivered entry");
            }
            return Err(DomainError::internal(format!(
                "Failed to notify recipient: {}",
                e
            )));
        }

        Ok(entry)
    }

    /// Looks up an entry by id and nonce.
    ///
    /// Returns `None` when the entry does not exist, the nonce does not match,
    /// or the deadline has passed. In the last case the entry is moved to the
    /// expired projection as a side effect.
    pub async fn find_entry(&self, id: Uuid, nonce_hex: &str) -> DomainResult<Option<Entry>> {
        let entry = match self.repository.find(id).await? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if entry.is_expired_at(Utc::now()) {
            self.expire(&entry, ExpiryReason::TimeExpired).await?;
            return Ok(None);
        }

        let presented = match hex::decode(nonce_hex.trim()) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(None),
        };

        if !entry.nonce_matches(&presented) {
            debug!(entry_id = %id, "Nonce mismatch");
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Lists a user's active entries, oldest first.
    ///
    /// Entries past their deadline are expired and left out.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Entry>> {
        let now = Utc::now();
        let mut active = Vec::new();

        for entry in self.repository.find_by_owner(owner_id).await? {
            if entry.is_expired_at(now) {
                self.expire(&entry, ExpiryReason::TimeExpired).await?;
            } else {
                active.push(entry);
            }
        }

        Ok(active)
    }

    /// Attempts to reveal an entry's value.
    ///
    /// A correct phrase claims the entry in the same step, so the value is
    /// returned at most once. A wrong phrase counts against the attempt limit;
    /// the guess that reaches the limit expires the entry.
    pub async fn decrypt_entry(
        &self,
        id: Uuid,
        nonce_hex: &str,
        secret: &str,
    ) -> DomainResult<RevealOutcome> {
        let entry = match self.find_entry(id, nonce_hex).await? {
            Some(entry) => entry,
            None => return Ok(RevealOutcome::InvalidEntry),
        };

        match self.cipher.open(&entry.value, &entry.nonce, secret) {
            Some(value) => {
                if self.repository.record_claim(&entry.claim(Utc::now())).await? {
                    info!(entry_id = %id, "Entry claimed");
                    Ok(RevealOutcome::Revealed { value })
                } else {
                    debug!(entry_id = %id, "Entry left active storage before it could be claimed");
                    Ok(RevealOutcome::InvalidEntry)
                }
            }
            None => self.register_invalid_attempt(&entry).await,
        }
    }

    /// Expires up to `limit` entries whose deadline has passed.
    ///
    /// Returns how many this call transitioned.
    pub async fn expire_overdue(&self, limit: usize) -> DomainResult<usize> {
        let overdue = self.repository.find_expired(Utc::now(), limit).await?;
        let mut expired = 0;

        for entry in &overdue {
            if self.expire(entry, ExpiryReason::TimeExpired).await? {
                expired += 1;
            }
        }

        Ok(expired)
    }

    async fn register_invalid_attempt(&self, entry: &Entry) -> DomainResult<RevealOutcome> {
        let attempts = match self.repository.increment_invalid_attempts(entry.id).await? {
            Some(attempts) => attempts,
            None => return Ok(RevealOutcome::InvalidSecret { expired: false }),
        };

        if attempts >= self.config.max_invalid_attempts {
            warn!(entry_id = %entry.id, attempts, "Attempt limit reached, expiring entry");
            self.expire(entry, ExpiryReason::TooManyAttempts).await?;
            return Ok(RevealOutcome::InvalidSecret { expired: true });
        }

        debug!(entry_id = %entry.id, attempts, "Invalid secret presented");
        Ok(RevealOutcome::InvalidSecret { expired: false })
    }

    async fn expire(&self, entry: &Entry, reason: ExpiryReason) -> DomainResult<bool> {
        let transitioned = self
            .repository
            .record_expiry(&entry.expire(reason, Utc::now()))
            .await?;

        if transitioned {
            info!(entry_id = %entry.id, reason = ?reason, "Entry expired");
        }
        Ok(transitioned)
    }

    fn validate(&self, request: &CreateEntryRequest) -> DomainResult<()> {
        let mut errors = Vec::new();

        if request.sent_by_user_id.is_nil() {
            errors.push(messages::SENDER_REQUIRED.to_string());
        }
        if request.name.trim().is_empty() {
            errors.push(messages::NAME_REQUIRED.to_string());
        }
        if request.sent_to_email.trim().is_empty() {
            errors.push(messages::RECIPIENT_REQUIRED.to_string());
        }
        if request.value.trim().is_empty() {
            errors.push(messages::VALUE_REQUIRED.to_string());
        } else if request.value.len() > self.config.max_value_bytes {
            errors.push(messages::value_too_large(self.config.max_value_bytes));
        }
        if request.secret.trim().is_empty() {
            errors.push(messages::SECRET_REQUIRED.to_string());
        }
        if request.duration <= Duration::zero() {
            errors.push(messages::DURATION_POSITIVE.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation { errors })
        }
    }
}
