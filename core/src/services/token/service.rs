//! Main token service implementation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, IssuedToken, RefreshToken, TokenPair, REFRESH_TOKEN_BYTES};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::TokenRepository;
use crate::services::random::{OsRandomSource, RandomSource};

use super::config::TokenServiceConfig;
use super::verifier::AccessTokenVerifier;

/// Algorithms accepted when verifying; all share the HMAC secret
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Service for managing JWT access tokens and refresh tokens
pub struct TokenService<R: TokenRepository> {
    repository: R,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    random: Arc<dyn RandomSource>,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Token repository for refresh token persistence
    /// * `config` - Token service configuration
    pub fn new(repository: R, config: TokenServiceConfig) -> Self {
        Self::with_random_source(repository, config, Arc::new(OsRandomSource))
    }

    /// Creates a new token service drawing refresh token bytes from `random`
    pub fn with_random_source(
        repository: R,
        config: TokenServiceConfig,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            repository,
            config,
            encoding_key,
            decoding_key,
            validation,
            random,
        }
    }

    /// Access the underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Issues a signed access token for `user_id`
    pub fn issue_access_token(&self, user_id: Uuid) -> DomainResult<IssuedToken> {
        self.issue_access_token_at(user_id, Utc::now())
    }

    fn issue_access_token_at(&self, user_id: Uuid, now: DateTime<Utc>) -> DomainResult<IssuedToken> {
        let claims = Claims::new_access_token(
            user_id,
            &self.config.issuer,
            now,
            self.config.access_token_lifetime,
        );
        let token = self.encode_jwt(&claims)?;
        Ok(IssuedToken::new(token, now + self.config.access_token_lifetime))
    }

    /// Generates an opaque refresh token value.
    ///
    /// The value carries no identity; it is only meaningful once stored
    /// against a user.
    pub fn issue_refresh_token(&self) -> IssuedToken {
        self.issue_refresh_token_at(Utc::now())
    }

    fn issue_refresh_token_at(&self, now: DateTime<Utc>) -> IssuedToken {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        self.random.fill_bytes(&mut bytes);
        IssuedToken::new(hex::encode(bytes), now + self.config.refresh_token_lifetime)
    }

    /// Issues an access and refresh token pair and stores the refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Both tokens; only the refresh token hash is persisted
    /// * `Err(DomainError)` - Signing or storage failed
    pub async fn issue_session(&self, user_id: Uuid) -> DomainResult<TokenPair> {
        let now = Utc::now();
        let access_token = self.issue_access_token_at(user_id, now)?;
        let refresh_token = self.issue_refresh_token_at(now);

        let record = RefreshToken::new(
            user_id,
            Self::hash_token(&refresh_token.token),
            now,
            self.config.refresh_token_lifetime,
        );
        self.repository.create_refresh_token(&record).await?;
        info!(user_id = %user_id, refresh_token_id = %record.id, "Session issued");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verifies an access token and returns the user id in its subject.
    ///
    /// Each failure has its own [`TokenError`] variant. No storage is consulted.
    pub fn verify_access_token(&self, token: &str) -> Result<Uuid, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::MissingToken);
        }

        let header = decode_header(token).map_err(|_| TokenError::InvalidTokenFormat)?;
        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            return Err(TokenError::InvalidSignature);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| Self::map_decode_error(e.kind()))?;

        token_data
            .claims
            .user_id()
            .map_err(|_| TokenError::InvalidClaims)
    }

    /// Looks up the stored refresh token matching both `value` and `user_id`
    ///
    /// # Returns
    ///
    /// * `Ok(RefreshToken)` - The stored record
    /// * `Err(TokenError::InvalidRefreshToken)` - No record for that value and user
    /// * `Err(TokenError::RefreshTokenExpired)` - The record is past its expiry
    pub async fn verify_refresh_token(&self, value: &str, user_id: Uuid) -> DomainResult<RefreshToken> {
        let value = value.trim();
        if value.is_empty() {
            return Err(TokenError::InvalidRefreshToken.into());
        }

        let record = self
            .repository
            .find_by_token_and_user(&Self::hash_token(value), user_id)
            .await?
            .ok_or(TokenError::InvalidRefreshToken)?;

        if record.is_expired() {
            debug!(refresh_token_id = %record.id, "Refresh token expired");
            return Err(TokenError::RefreshTokenExpired.into());
        }

        Ok(record)
    }

    /// Issues a new access token for the owner of a verified refresh token.
    ///
    /// The refresh token itself stays valid.
    pub fn refresh_access_token(&self, record: &RefreshToken) -> DomainResult<IssuedToken> {
        self.issue_access_token(record.user_id)
    }

    /// Deletes a refresh token so it can no longer be used
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The token was deleted
    /// * `Ok(false)` - It was already gone
    pub async fn revoke_refresh_token(&self, record: &RefreshToken) -> DomainResult<bool> {
        let deleted = self.repository.delete_refresh_token(record.id).await?;
        if deleted {
            info!(user_id = %record.user_id, refresh_token_id = %record.id, "Refresh token revoked");
        }
        Ok(deleted)
    }

    /// Removes refresh tokens past their expiry; returns how many were deleted
    pub async fn delete_expired_refresh_tokens(&self) -> DomainResult<usize> {
        self.repository
            .delete_expired_tokens(Utc::now())
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to delete expired refresh tokens: {}", e),
            })
    }

    /// SHA-256 of a refresh token value, hex encoded, as stored
    pub fn hash_token(value: &str) -> String {
        hex::encode(Sha256::digest(value.as_bytes()))
    }

    fn encode_jwt(&self, claims: &Claims) -> DomainResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    fn map_decode_error(kind: &ErrorKind) -> TokenError {
        match kind {
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => TokenError::InvalidSignature,
            ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::Json(_) => TokenError::InvalidClaims,
            _ => TokenError::InvalidTokenFormat,
        }
    }
}

impl<R: TokenRepository> AccessTokenVerifier for TokenService<R> {
    fn verify_access_token(&self, token: &str) -> Result<Uuid, TokenError> {
        TokenService::verify_access_token(self, token)
    }
}
