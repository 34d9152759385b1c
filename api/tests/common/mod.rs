//! Shared setup for API integration tests

#![allow(dead_code)]

use actix_web::web;
use sk_api::AppState;
use sk_core::repositories::{MockEntryRepository, MockTokenRepository, MockUserRepository};
use sk_core::services::{
    EntryService, EntryServiceConfig, TokenService, TokenServiceConfig, UserService,
    UserServiceConfig,
};
use sk_infra::LogEntryNotifier;
use std::sync::Arc;

pub type TestState =
    AppState<MockEntryRepository, LogEntryNotifier, MockTokenRepository, MockUserRepository>;

pub const PASSWORD: &str = "correct horse battery";
pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestContext {
    pub state: web::Data<TestState>,
    pub entries: MockEntryRepository,
    pub tokens: MockTokenRepository,
    pub notifier: LogEntryNotifier,
}

pub fn token_config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: JWT_SECRET.to_string(),
        ..TokenServiceConfig::default()
    }
}

pub fn setup(max_invalid_attempts: u32) -> TestContext {
    let entries = MockEntryRepository::new();
    let tokens = MockTokenRepository::new();
    let notifier = LogEntryNotifier::with_options("https://sendkey.test", false, false);

    let entry_service = EntryService::new(
        entries.clone(),
        notifier.clone(),
        EntryServiceConfig {
            encryption_key: b"integration-master-key".to_vec(),
            max_invalid_attempts,
            max_value_bytes: 1024,
        },
    );
    let token_service = TokenService::new(tokens.clone(), token_config());
    let user_service = UserService::new(
        MockUserRepository::new(),
        UserServiceConfig {
            bcrypt_cost: 4,
            min_password_length: 8,
        },
    );

    let state = web::Data::new(AppState::new(
        Arc::new(entry_service),
        Arc::new(token_service),
        Arc::new(user_service),
    ));

    TestContext {
        state,
        entries,
        tokens,
        notifier,
    }
}

/// Sends a request and reads the status and JSON body
macro_rules! call_json {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        (status, body)
    }};
}

/// Registers `$email` and logs in, yielding `(user_id, access_token, refresh_token)`
macro_rules! register_and_login {
    ($app:expr, $email:expr) => {{
        let (status, _) = call_json!(
            $app,
            actix_web::test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(serde_json::json!({
                    "email": $email,
                    "password": common::PASSWORD,
                    "firstName": "Test",
                    "lastName": "User",
                }))
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED);

        let (status, body) = call_json!(
            $app,
            actix_web::test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(serde_json::json!({ "email": $email, "password": common::PASSWORD }))
        );
        assert_eq!(status, actix_web::http::StatusCode::OK);

        let user_id: uuid::Uuid = body["userId"].as_str().unwrap().parse().unwrap();
        (
            user_id,
            body["accessToken"]["token"].as_str().unwrap().to_string(),
            body["refreshToken"]["token"].as_str().unwrap().to_string(),
        )
    }};
}
