//! Periodic maintenance of entries and refresh tokens
//!
//! Expires entries nobody looked at before their deadline and deletes refresh
//! tokens past their expiry. Every transition goes through the same
//! repository calls as the request path.

use std::sync::Arc;

use sk_shared::config::EntryConfig;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::{EntryRepository, TokenRepository};
use crate::services::entry::{EntryNotifier, EntryService};
use crate::services::token::TokenService;

/// Configuration for the cleanup service
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Maximum number of entries to expire in one cycle
    pub batch_size: usize,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            batch_size: 500,
            enabled: true,
        }
    }
}

impl From<&EntryConfig> for CleanupConfig {
    fn from(config: &EntryConfig) -> Self {
        Self {
            interval_seconds: config.cleanup_interval_seconds.max(1),
            batch_size: config.cleanup_batch_size,
            enabled: config.cleanup_enabled,
        }
    }
}

/// Service sweeping overdue entries and expired refresh tokens
pub struct CleanupService<E, N, T>
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
{
    entries: Arc<EntryService<E, N>>,
    tokens: Arc<TokenService<T>>,
    config: CleanupConfig,
}

impl<E, N, T> CleanupService<E, N, T>
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
{
    /// Create a new cleanup service
    pub fn new(
        entries: Arc<EntryService<E, N>>,
        tokens: Arc<TokenService<T>>,
        config: CleanupConfig,
    ) -> Self {
        Self {
            entries,
            tokens,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// Failures of one task are recorded in the result and do not stop the
    /// other.
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let mut result = CleanupResult::default();

        match self.entries.expire_overdue(self.config.batch_size).await {
            Ok(count) => result.expired_entries = count,
            Err(e) => {
                error!("Failed to expire overdue entries: {}", e);
                result.errors.push(format!("Entry cleanup error: {}", e));
            }
        }

        match self.tokens.delete_expired_refresh_tokens().await {
            Ok(count) => result.expired_tokens_deleted = count,
            Err(e) => {
                error!("Failed to delete expired refresh tokens: {}", e);
                result.errors.push(format!("Token cleanup error: {}", e));
            }
        }

        if result.total_cleaned() > 0 {
            info!(
                "Cleanup completed - Entries expired: {}, Refresh tokens deleted: {}",
                result.expired_entries, result.expired_tokens_deleted
            );
        }

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                "Cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.is_success() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Cleanup cycle failed: {}", e);
                    }
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of entries moved to the expired projection
    pub expired_entries: usize,
    /// Number of expired refresh tokens deleted
    pub expired_tokens_deleted: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get total number of items cleaned up
    pub fn total_cleaned(&self) -> usize {
        self.expired_entries + self.expired_tokens_deleted
    }
}
