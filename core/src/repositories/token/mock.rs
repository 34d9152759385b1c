//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// Mock token repository for testing
#[derive(Clone, Default)]
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, RefreshToken>>>,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether no tokens are stored
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    /// Overwrite the expiry of a stored token
    pub async fn set_expires_at(&self, id: Uuid, expires_at: DateTime<Utc>) -> bool {
        match self.tokens.write().await.get_mut(&id) {
            Some(token) => {
                token.expires_at = expires_at;
                true
            }
            None => false,
        }
    }

    /// All tokens belonging to a user
    pub async fn tokens_for(&self, user_id: Uuid) -> Vec<RefreshToken> {
        self.tokens
            .read()
            .await
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;

        // Check for duplicate
        if tokens.values().any(|t| t.token_hash == token.token_hash) {
            return Err(DomainError::internal("Token already exists"));
        }

        tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn find_by_token_and_user(
        &self,
        token_hash: &str,
        user_id: Uuid,
    ) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .find(|t| t.token_hash == token_hash && t.user_id == user_id)
            .cloned())
    }

    async fn delete_refresh_token(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.tokens.write().await.remove(&id).is_some())
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, token| !token.is_expired_at(now));

        Ok(initial_count - tokens.len())
    }
}
