//! Secret entry entities.
//!
//! An [`Entry`] is the active, revealable record. It leaves active storage
//! exactly once, becoming either a [`ClaimedEntry`] or an [`ExpiredEntry`].

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the per-entry nonce in bytes (the AES-GCM nonce size)
pub const NONCE_LENGTH: usize = 12;

/// Active secret entry awaiting a single reveal
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    /// Unique identifier for the entry
    pub id: Uuid,

    /// Display name chosen by the sender
    pub name: String,

    /// User who created the entry
    pub sent_by_user_id: Uuid,

    /// Recipient address the link is delivered to
    pub sent_to_email: String,

    /// Random nonce; both the lookup capability and the cipher nonce
    pub nonce: [u8; NONCE_LENGTH],

    /// Ciphertext of the protected value, authentication tag included
    pub value: Vec<u8>,

    /// Number of wrong secret phrases presented so far
    pub invalid_attempts: u32,

    /// Timestamp when the entry was created
    pub created_at: DateTime<Utc>,

    /// Deadline after which the entry can no longer be revealed
    pub expires_at: DateTime<Utc>,
}

impl Entry {
    /// Creates a new active entry with no invalid attempts
    pub fn new(
        name: String,
        sent_by_user_id: Uuid,
        sent_to_email: String,
        nonce: [u8; NONCE_LENGTH],
        value: Vec<u8>,
        created_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            sent_by_user_id,
            sent_to_email,
            nonce,
            value,
            invalid_attempts: 0,
            created_at,
            expires_at: created_at
                .checked_add_signed(duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Whether the deadline has been reached at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the deadline has been reached
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Compares a presented nonce against the stored one in constant time
    pub fn nonce_matches(&self, presented: &[u8]) -> bool {
        presented.len() == NONCE_LENGTH && constant_time_eq(presented, &self.nonce)
    }

    /// Lowercase hex rendering of the nonce, as carried in recipient links
    pub fn nonce_hex(&self) -> String {
        hex::encode(self.nonce)
    }

    /// Builds the claimed projection of this entry
    pub fn claim(&self, claimed_at: DateTime<Utc>) -> ClaimedEntry {
        ClaimedEntry {
            entry_id: self.id,
            name: self.name.clone(),
            sent_by_user_id: self.sent_by_user_id,
            sent_to_email: self.sent_to_email.clone(),
            claimed_at,
        }
    }

    /// Builds the expired projection of this entry
    pub fn expire(&self, reason: ExpiryReason, expired_at: DateTime<Utc>) -> ExpiredEntry {
        ExpiredEntry {
            entry_id: self.id,
            name: self.name.clone(),
            sent_by_user_id: self.sent_by_user_id,
            sent_to_email: self.sent_to_email.clone(),
            too_many_attempts: reason == ExpiryReason::TooManyAttempts,
            expired_at,
        }
    }
}

// Nonce and ciphertext stay out of logs.
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("sent_by_user_id", &self.sent_by_user_id)
            .field("invalid_attempts", &self.invalid_attempts)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Why an entry left active storage without being claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    /// The deadline passed
    TimeExpired,
    /// The invalid attempt limit was reached
    TooManyAttempts,
}

/// Terminal record of a successful reveal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedEntry {
    pub entry_id: Uuid,
    pub name: String,
    pub sent_by_user_id: Uuid,
    pub sent_to_email: String,
    pub claimed_at: DateTime<Utc>,
}

/// Terminal record of an entry that can no longer be revealed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiredEntry {
    pub entry_id: Uuid,
    pub name: String,
    pub sent_by_user_id: Uuid,
    pub sent_to_email: String,
    pub too_many_attempts: bool,
    pub expired_at: DateTime<Utc>,
}

impl ExpiredEntry {
    pub fn reason(&self) -> ExpiryReason {
        if self.too_many_attempts {
            ExpiryReason::TooManyAttempts
        } else {
            ExpiryReason::TimeExpired
        }
    }
}
