pub mod entry;
pub mod token;
pub mod user;

pub use entry::EntryRepository;
pub use token::TokenRepository;
pub use user::UserRepository;

#[cfg(any(test, feature = "mock-repositories"))]
pub use entry::MockEntryRepository;
#[cfg(any(test, feature = "mock-repositories"))]
pub use token::MockTokenRepository;
#[cfg(any(test, feature = "mock-repositories"))]
pub use user::MockUserRepository;
