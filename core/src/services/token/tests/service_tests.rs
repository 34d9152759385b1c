//! Unit tests for token service

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, TokenError};
use crate::repositories::MockTokenRepository;
use crate::services::random::SeededRandomSource;
use crate::services::token::{AccessTokenVerifier, TokenService, TokenServiceConfig};

const SECRET: &str = "unit-test-secret";

fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: SECRET.to_string(),
        issuer: "sendkey".to_string(),
        access_token_lifetime: Duration::minutes(15),
        refresh_token_lifetime: Duration::days(7),
    }
}

fn create_service() -> (TokenService<MockTokenRepository>, MockTokenRepository) {
    let repository = MockTokenRepository::new();
    (TokenService::new(repository.clone(), test_config()), repository)
}

fn sign(claims: &Claims, algorithm: Algorithm, secret: &str) -> String {
    encode(&Header::new(algorithm), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

#[test]
fn test_access_token_round_trip() {
    let (service, _) = create_service();
    let user_id = Uuid::new_v4();

    let issued = service.issue_access_token(user_id).unwrap();

    assert_eq!(service.verify_access_token(&issued.token), Ok(user_id));
    let lifetime = issued.expires - Utc::now().timestamp();
    assert!((14 * 60..=15 * 60).contains(&lifetime));
}

#[test]
fn test_rejection_reasons_are_distinct() {
    let (service, _) = create_service();
    let user_id = Uuid::new_v4();

    let other_key = TokenService::new(
        MockTokenRepository::new(),
        TokenServiceConfig {
            jwt_secret: "another-secret".to_string(),
            ..test_config()
        },
    );
    let wrong_key = other_key.issue_access_token(user_id).unwrap();

    let expired_issuer = TokenService::new(
        MockTokenRepository::new(),
        TokenServiceConfig {
            access_token_lifetime: Duration::seconds(-60),
            ..test_config()
        },
    );
    let expired = expired_issuer.issue_access_token(user_id).unwrap();

    let mut claims = Claims::new_access_token(user_id, "sendkey", Utc::now(), Duration::minutes(5));
    claims.sub = "not-a-uuid".to_string();
    let bad_subject = sign(&claims, Algorithm::HS256, SECRET);

    let reasons = [
        service.verify_access_token(&wrong_key.token).unwrap_err(),
        service.verify_access_token(&expired.token).unwrap_err(),
        service.verify_access_token(&bad_subject).unwrap_err(),
    ];

    assert_eq!(
        reasons,
        [
            TokenError::InvalidSignature,
            TokenError::TokenExpired,
            TokenError::InvalidClaims
        ]
    );
}

#[test]
fn test_missing_and_malformed_tokens() {
    let (service, _) = create_service();

    assert_eq!(service.verify_access_token(""), Err(TokenError::MissingToken));
    assert_eq!(service.verify_access_token("   "), Err(TokenError::MissingToken));
    assert_eq!(
        service.verify_access_token("definitely.not.a-jwt"),
        Err(TokenError::InvalidTokenFormat)
    );
    assert_eq!(
        service.verify_access_token("garbage"),
        Err(TokenError::InvalidTokenFormat)
    );
}

#[test]
fn test_non_hmac_algorithm_is_rejected() {
    let (service, _) = create_service();
    // {"alg":"RS256","typ":"JWT"} . {} . "sig"
    let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.e30.c2ln";

    assert_eq!(service.verify_access_token(token), Err(TokenError::InvalidSignature));
}

#[test]
fn test_other_hmac_algorithms_are_accepted() {
    let (service, _) = create_service();
    let user_id = Uuid::new_v4();
    let claims = Claims::new_access_token(user_id, "sendkey", Utc::now(), Duration::minutes(5));

    for algorithm in [Algorithm::HS384, Algorithm::HS512] {
        let token = sign(&claims, algorithm, SECRET);
        assert_eq!(service.verify_access_token(&token), Ok(user_id));
    }
}

#[test]
fn test_wrong_issuer_is_invalid_claims() {
    let (service, _) = create_service();
    let claims = Claims::new_access_token(Uuid::new_v4(), "someone-else", Utc::now(), Duration::minutes(5));
    let token = sign(&claims, Algorithm::HS256, SECRET);

    assert_eq!(service.verify_access_token(&token), Err(TokenError::InvalidClaims));
}

#[test]
fn test_verifier_trait_object() {
    let (service, _) = create_service();
    let user_id = Uuid::new_v4();
    let token = service.issue_access_token(user_id).unwrap().token;

    let verifier: Arc<dyn AccessTokenVerifier> = Arc::new(service);
    assert_eq!(verifier.verify_access_token(&token), Ok(user_id));
}

#[test]
fn test_refresh_token_value_is_opaque_hex() {
    let (service, _) = create_service();

    let first = service.issue_refresh_token();
    let second = service.issue_refresh_token();

    assert_eq!(first.token.len(), 64);
    assert!(first.token.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(first.token, second.token);
}

#[test]
fn test_seeded_refresh_tokens_repeat() {
    let make = || {
        TokenService::with_random_source(
            MockTokenRepository::new(),
            test_config(),
            Arc::new(SeededRandomSource::new(11)),
        )
    };

    assert_eq!(make().issue_refresh_token().token, make().issue_refresh_token().token);
}

#[tokio::test]
async fn test_session_stores_only_the_hash() {
    let (service, repository) = create_service();
    let user_id = Uuid::new_v4();

    let pair = service.issue_session(user_id).await.unwrap();

    let stored = repository.tokens_for(user_id).await;
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].token_hash, pair.refresh_token.token);
    assert_eq!(
        stored[0].token_hash,
        TokenService::<MockTokenRepository>::hash_token(&pair.refresh_token.token)
    );
    assert_eq!(stored[0].expires_at.timestamp(), pair.refresh_token.expires);
    assert_eq!(service.verify_access_token(&pair.access_token.token), Ok(user_id));
}

#[tokio::test]
async fn test_refresh_token_requires_matching_user() {
    let (service, _) = create_service();
    let user_id = Uuid::new_v4();
    let pair = service.issue_session(user_id).await.unwrap();

    let record = service
        .verify_refresh_token(&pair.refresh_token.token, user_id)
        .await
        .unwrap();
    assert_eq!(record.user_id, user_id);

    let other_user = service
        .verify_refresh_token(&pair.refresh_token.token, Uuid::new_v4())
        .await;
    assert!(matches!(
        other_user,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));

    let wrong_value = service.verify_refresh_token(&"ab".repeat(32), user_id).await;
    assert!(matches!(
        wrong_value,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));

    let empty = service.verify_refresh_token("", user_id).await;
    assert!(matches!(
        empty,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));
}

#[tokio::test]
async fn test_expired_refresh_token_is_rejected() {
    let (service, repository) = create_service();
    let user_id = Uuid::new_v4();
    let pair = service.issue_session(user_id).await.unwrap();
    let id = repository.tokens_for(user_id).await[0].id;

    repository
        .set_expires_at(id, Utc::now() - Duration::seconds(1))
        .await;

    let result = service.verify_refresh_token(&pair.refresh_token.token, user_id).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::RefreshTokenExpired))
    ));
}

#[tokio::test]
async fn test_refresh_issues_new_access_token_without_rotation() {
    let (service, repository) = create_service();
    let user_id = Uuid::new_v4();
    let pair = service.issue_session(user_id).await.unwrap();

    let record = service
        .verify_refresh_token(&pair.refresh_token.token, user_id)
        .await
        .unwrap();
    let access = service.refresh_access_token(&record).unwrap();

    assert_eq!(service.verify_access_token(&access.token), Ok(user_id));
    assert_eq!(repository.len().await, 1);
    assert!(service
        .verify_refresh_token(&pair.refresh_token.token, user_id)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_revoked_refresh_token_stops_working() {
    let (service, repository) = create_service();
    let user_id = Uuid::new_v4();
    let pair = service.issue_session(user_id).await.unwrap();
    let record = service
        .verify_refresh_token(&pair.refresh_token.token, user_id)
        .await
        .unwrap();

    assert!(service.revoke_refresh_token(&record).await.unwrap());
    assert!(!service.revoke_refresh_token(&record).await.unwrap());
    assert!(repository.is_empty().await);

    let result = service.verify_refresh_token(&pair.refresh_token.token, user_id).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));
}

#[tokio::test]
async fn test_delete_expired_refresh_tokens() {
    let (service, repository) = create_service();
    let user_id = Uuid::new_v4();

    service.issue_session(user_id).await.unwrap();
    service.issue_session(user_id).await.unwrap();
    let stale = repository.tokens_for(user_id).await[0].id;
    repository
        .set_expires_at(stale, Utc::now() - Duration::hours(1))
        .await;

    assert_eq!(service.delete_expired_refresh_tokens().await.unwrap(), 1);
    assert_eq!(repository.len().await, 1);
    assert_eq!(service.delete_expired_refresh_tokens().await.unwrap(), 0);
}
