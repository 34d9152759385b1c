//! Domain entities representing core business objects.

pub mod entry;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use entry::{ClaimedEntry, Entry, ExpiredEntry, ExpiryReason, NONCE_LENGTH};
pub use token::{Claims, IssuedToken, RefreshToken, TokenPair, REFRESH_TOKEN_BYTES};
pub use user::User;
