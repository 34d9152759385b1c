//! # SendKey Core
//!
//! Domain layer for the SendKey server: one-time secret entries, access and
//! refresh tokens, user accounts, the repository interfaces they persist
//! through, and the error types shared by every crate above this one.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use domain::{ClaimedEntry, Entry, ExpiredEntry, ExpiryReason, IssuedToken, RefreshToken, TokenPair, User};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{EntryRepository, TokenRepository, UserRepository};
pub use services::{
    AccessTokenVerifier, CleanupService, EntryNotifier, EntryService, RevealOutcome, TokenService,
    UserService,
};
