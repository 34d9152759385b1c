//! Secret entry configuration

use serde::{Deserialize, Serialize};

const DEFAULT_ENCRYPTION_KEY: &str = "sendkey-development-master-key";

/// Settings for the entry lifecycle: encryption, attempt limit and cleanup
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EntryConfig {
    /// Master key mixed into every entry's key derivation
    pub encryption_key: String,

    /// Wrong guesses allowed before an entry is expired
    pub max_invalid_attempts: u32,

    /// Largest accepted plaintext value in bytes
    pub max_value_bytes: usize,

    /// Base URL used when building the recipient link
    pub link_base_url: String,

    /// Print recipient links to stdout (development only)
    pub console_notifications: bool,

    /// Run the periodic sweep of overdue entries and expired refresh tokens
    pub cleanup_enabled: bool,

    /// Seconds between cleanup cycles
    pub cleanup_interval_seconds: u64,

    /// Maximum overdue entries expired per cycle
    pub cleanup_batch_size: usize,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            encryption_key: String::from(DEFAULT_ENCRYPTION_KEY),
            max_invalid_attempts: 3,
            max_value_bytes: 64 * 1024,
            link_base_url: String::from("http://localhost:8080/api/v1"),
            console_notifications: false,
            cleanup_enabled: true,
            cleanup_interval_seconds: 300,
            cleanup_batch_size: 500,
        }
    }
}

impl EntryConfig {
    /// Check if using the development master key (security warning)
    pub fn is_using_default_key(&self) -> bool {
        self.encryption_key == DEFAULT_ENCRYPTION_KEY
    }
}
