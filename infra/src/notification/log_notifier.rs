//! Logging implementation of the entry notifier

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use sk_core::domain::entities::entry::Entry;
use sk_core::errors::{DomainError, DomainResult};
use sk_core::services::entry::EntryNotifier;
use sk_shared::config::EntryConfig;
use sk_shared::utils::email::mask_email;

use crate::InfrastructureError;

/// Notifier that logs instead of sending email
///
/// This implementation:
/// - Logs the masked recipient and entry id
/// - Prints the full link to the console when enabled
/// - Counts deliveries for tests
#[derive(Clone)]
pub struct LogEntryNotifier {
    /// Base URL links are built from, without trailing slash
    link_base_url: String,
    /// Number of notifications delivered
    delivered: Arc<AtomicU64>,
    /// Whether to simulate failures (for testing)
    simulate_failure: Arc<AtomicBool>,
    /// Whether to print links to the console
    console_output: bool,
}

impl LogEntryNotifier {
    pub fn new(link_base_url: impl Into<String>) -> Self {
        Self::with_options(link_base_url, false, false)
    }

    /// Create a notifier with configurable options
    pub fn with_options(link_base_url: impl Into<String>, console_output: bool, simulate_failure: bool) -> Self {
        let link_base_url = link_base_url.into().trim_end_matches('/').to_string();
        Self {
            link_base_url,
            delivered: Arc::new(AtomicU64::new(0)),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            console_output,
        }
    }

    pub fn from_config(config: &EntryConfig) -> Self {
        Self::with_options(config.link_base_url.clone(), config.console_notifications, false)
    }

    /// Link the recipient opens to reveal the entry
    pub fn entry_link(&self, entry: &Entry, nonce_hex: &str) -> String {
        format!("{}/entries/{}?nonce={}", self.link_base_url, entry.id, nonce_hex)
    }

    /// Get the total number of notifications delivered
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Enable or disable failure simulation; clones share the flag
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    async fn deliver(&self, entry: &Entry, nonce_hex: &str) -> Result<(), InfrastructureError> {
        let recipient = mask_email(&entry.sent_to_email);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(entry_id = %entry.id, recipient = %recipient, "Simulating notification failure");
            return Err(InfrastructureError::Notification(
                "Simulated notification failure".to_string(),
            ));
        }

        let count = self.delivered.fetch_add(1, Ordering::SeqCst) + 1;

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("ENTRY NOTIFICATION #{}", count);
            println!("{}", "=".repeat(60));
            println!("To: {}", entry.sent_to_email);
            println!("Entry: {}", entry.name);
            println!("Link: {}", self.entry_link(entry, nonce_hex));
            println!("{}\n", "=".repeat(60));
        }

        info!(
            target: "entry_notifier",
            entry_id = %entry.id,
            recipient = %recipient,
            expires_at = %entry.expires_at,
            "Recipient notified"
        );

        Ok(())
    }
}

#[async_trait]
impl EntryNotifier for LogEntryNotifier {
    async fn notify_recipient(&self, entry: &Entry, nonce_hex: &str) -> DomainResult<()> {
        self.deliver(entry, nonce_hex).await.map_err(DomainError::from)
    }
}
