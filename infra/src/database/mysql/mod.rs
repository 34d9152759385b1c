//! MySQL repository implementations

mod entry_repository_impl;
mod token_repository_impl;
mod user_repository_impl;

pub use entry_repository_impl::MySqlEntryRepository;
pub use token_repository_impl::MySqlTokenRepository;
pub use user_repository_impl::MySqlUserRepository;

use sk_core::errors::DomainError;
use uuid::Uuid;

/// Maps a SQLx failure to an internal domain error carrying `context`
fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::Internal {
        message: format!("{}: {}", context, e),
    }
}

/// Parses a `CHAR(36)` column value
fn parse_uuid(value: &str, column: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", column, e),
    })
}
