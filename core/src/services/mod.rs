//! Business services containing domain logic and use cases.

pub mod cleanup;
pub mod entry;
pub mod random;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use cleanup::{CleanupConfig, CleanupResult, CleanupService};
pub use entry::{CreateEntryRequest, EntryNotifier, EntryService, EntryServiceConfig, RevealOutcome};
pub use random::{OsRandomSource, RandomSource, SeededRandomSource};
pub use token::{AccessTokenVerifier, TokenService, TokenServiceConfig};
pub use user::{CreateUserRequest, UserService, UserServiceConfig};
