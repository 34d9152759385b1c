//! Entry lifecycle module
//!
//! Owns the state machine of a secret entry:
//! - creation (encrypt + persist + notify)
//! - nonce-bound lookup with lazy expiry
//! - attempt-limited reveal ending in a claim
//! - the two terminal projections (claimed, expired)

mod cipher;
mod config;
mod notifier;
mod service;


pub use cipher::{EntryCipher, KEY_LENGTH};
pub use config::EntryServiceConfig;
pub use notifier::EntryNotifier;
pub use service::{messages, CreateEntryRequest, EntryService, RevealOutcome};
