//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken entity persistence operations
///
/// # Security Considerations
/// - Only hashes of token values are stored
/// - Lookups always match both the hash and the owning user
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token
    ///
    /// # Arguments
    /// * `token` - The RefreshToken entity to persist
    ///
    /// # Returns
    /// * `Ok(())` - Token stored
    /// * `Err(DomainError)` - Save failed (e.g., duplicate token)
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use uuid::Uuid;
    /// # use sk_core::repositories::TokenRepository;
    /// # use sk_core::domain::entities::token::RefreshToken;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let token = RefreshToken::new(Uuid::new_v4(), "sha256-hex".to_string(), Utc::now(), Duration::days(7));
    /// repo.create_refresh_token(&token).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), DomainError>;

    /// Find a refresh token by its hashed value and owning user
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Both the hash and the user matched
    /// * `Ok(None)` - No such token for that user
    /// * `Err(DomainError)` - Database error occurred
    async fn find_by_token_and_user(
        &self,
        token_hash: &str,
        user_id: Uuid,
    ) -> Result<Option<RefreshToken>, DomainError>;

    /// Delete a refresh token by id
    ///
    /// # Returns
    /// * `Ok(true)` - Token was deleted
    /// * `Ok(false)` - Token not found
    async fn delete_refresh_token(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Delete every refresh token that expired at or before `now`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of expired tokens deleted
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
