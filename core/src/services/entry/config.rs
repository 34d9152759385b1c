//! Configuration for the entry service

use sk_shared::config::EntryConfig;

/// Configuration for the entry service
#[derive(Clone)]
pub struct EntryServiceConfig {
    /// Master key mixed into every key derivation
    pub encryption_key: Vec<u8>,
    /// Wrong guesses allowed before the entry is expired (at least 1)
    pub max_invalid_attempts: u32,
    /// Largest accepted plaintext in bytes
    pub max_value_bytes: usize,
}

impl Default for EntryServiceConfig {
    fn default() -> Self {
        Self::from(&EntryConfig::default())
    }
}

impl From<&EntryConfig> for EntryServiceConfig {
    fn from(config: &EntryConfig) -> Self {
        Self {
            encryption_key: config.encryption_key.as_bytes().to_vec(),
            max_invalid_attempts: config.max_invalid_attempts.max(1),
            max_value_bytes: config.max_value_bytes,
        }
    }
}

impl std::fmt::Debug for EntryServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryServiceConfig")
            .field("encryption_key", &"<redacted>")
            .field("max_invalid_attempts", &self.max_invalid_attempts)
            .field("max_value_bytes", &self.max_value_bytes)
            .finish()
    }
}
