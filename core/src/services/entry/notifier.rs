//! Recipient notification seam

use async_trait::async_trait;

use crate::domain::entities::entry::Entry;
use crate::errors::DomainResult;

/// Delivers the reveal link (entry id + hex nonce) to the recipient
#[async_trait]
pub trait EntryNotifier: Send + Sync {
    /// Notify `entry.sent_to_email` that an entry is waiting.
    ///
    /// `nonce_hex` is the lookup capability; implementations must not log it
    /// outside development tooling.
    async fn notify_recipient(&self, entry: &Entry, nonce_hex: &str) -> DomainResult<()>;
}
