//! End-to-end tests of the client against the API served on a local port

use std::sync::Arc;

use actix_web::{web, HttpServer};
use sk_api::{create_app, AppState};
use sk_client::{Client, ClientError, CreateEntryRequest, CreateUserRequest, Session};
use sk_core::repositories::{MockEntryRepository, MockTokenRepository, MockUserRepository};
use sk_core::services::{
    EntryService, EntryServiceConfig, TokenService, TokenServiceConfig, UserService,
    UserServiceConfig,
};
use sk_infra::LogEntryNotifier;
use sk_shared::config::ServerConfig;
use sk_shared::errors::error_codes;

const PASSWORD: &str = "correct horse battery";
const JWT_SECRET: &str = "client-test-secret";

fn token_config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: JWT_SECRET.to_string(),
        ..TokenServiceConfig::default()
    }
}

/// Serves the API with in-memory repositories and returns its base URL
fn spawn_server() -> (String, MockEntryRepository) {
    let entries = MockEntryRepository::new();
    let entry_service = EntryService::new(
        entries.clone(),
        LogEntryNotifier::with_options("https://sendkey.test", false, false),
        EntryServiceConfig {
            encryption_key: b"client-master-key".to_vec(),
            max_invalid_attempts: 2,
            max_value_bytes: 1024,
        },
    );
    let token_service = TokenService::new(MockTokenRepository::new(), token_config());
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

    let server = HttpServer::new(move || create_app(state.clone(), &ServerConfig::default()))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    (format!("http://{}/api/v1", addr), entries)
}

async fn register_and_login(client: &Client, email: &str) -> uuid::Uuid {
    let user = client
        .users()
        .create_user(&CreateUserRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(user.email, email);

    let login = client.users().login(email, PASSWORD).await.unwrap();
    assert_eq!(login.user_id, user.id);
    user.id
}

fn entry_request(value: &str) -> CreateEntryRequest {
    CreateEntryRequest {
        name: "wifi password".to_string(),
        send_to_email: "recipient@example.com".to_string(),
        value: value.to_string(),
        secret: "open sesame".to_string(),
        duration: 60,
    }
}

#[actix_web::test]
async fn test_login_stores_session() {
    let (base_url, _) = spawn_server();
    let client = Client::builder(base_url).build().unwrap();

    let user_id = register_and_login(&client, "alice@example.com").await;

    let session = client.session().await;
    assert_eq!(session.user_id, Some(user_id));
    assert!(session.access_token.is_some());
    assert!(session.refresh_token.is_some());
}

#[actix_web::test]
async fn test_create_user_reports_every_problem() {
    let (base_url, _) = spawn_server();
    let client = Client::builder(base_url).build().unwrap();

    let err = client
        .users()
        .create_user(&CreateUserRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        })
        .await
        .unwrap_err();

    match err {
        ClientError::Rejected { errors, expired } => {
            assert!(errors.len() > 1);
            assert!(!expired);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[actix_web::test]
async fn test_create_find_reveal_and_list() {
    let (base_url, entries) = spawn_server();
    let client = Client::builder(base_url.clone()).build().unwrap();
    let user_id = register_and_login(&client, "bob@example.com").await;

    let entry = client.entries().create(&entry_request("hunter2")).await.unwrap();
    assert_eq!(entry.sent_by_user_id, user_id);
    let nonce = entries.active_entry(entry.id).await.unwrap().nonce_hex();

    let listed = client.entries().list().await.unwrap();
    assert_eq!(listed, vec![entry.clone()]);

    // Recipients reveal without logging in
    let recipient = Client::builder(base_url).build().unwrap();
    let found = recipient.entries().find(entry.id, &nonce).await.unwrap();
    assert_eq!(found.as_ref().map(|e| e.id), Some(entry.id));

    let value = recipient
        .entries()
        .reveal(entry.id, &nonce, "open sesame")
        .await
        .unwrap();
    assert_eq!(value, "hunter2");

    assert_eq!(recipient.entries().find(entry.id, &nonce).await.unwrap(), None);
}

#[actix_web::test]
async fn test_wrong_secrets_expire_entry() {
    let (base_url, entries) = spawn_server();
    let client = Client::builder(base_url).build().unwrap();
    register_and_login(&client, "carol@example.com").await;

    let entry = client.entries().create(&entry_request("hunter2")).await.unwrap();
    let nonce = entries.active_entry(entry.id).await.unwrap().nonce_hex();

    let first = client.entries().reveal(entry.id, &nonce, "guess").await.unwrap_err();
    assert!(matches!(first, ClientError::Rejected { expired: false, .. }));

    let second = client.entries().reveal(entry.id, &nonce, "guess").await.unwrap_err();
    assert!(matches!(second, ClientError::Rejected { expired: true, .. }));
}

#[actix_web::test]
async fn test_expired_access_token_is_refreshed_and_retried() {
    let (base_url, _) = spawn_server();
    let first = Client::builder(base_url.clone()).build().unwrap();
    let user_id = register_and_login(&first, "dave@example.com").await;
    let refresh_token = first.session().await.refresh_token.unwrap();

    let issuer = TokenService::new(
        MockTokenRepository::new(),
        TokenServiceConfig {
            access_token_lifetime: chrono::Duration::seconds(-60),
            ..token_config()
        },
    );
    let stale = issuer.issue_access_token(user_id).unwrap().token;

    let client = Client::builder(base_url)
        .session(Session::new(user_id, refresh_token, stale.clone()))
        .build()
        .unwrap();

    let entry = client.entries().create(&entry_request("hunter2")).await.unwrap();
    assert_eq!(entry.sent_by_user_id, user_id);

    let refreshed = client.session().await.access_token.unwrap();
    assert_ne!(refreshed, stale);
}

#[actix_web::test]
async fn test_failed_refresh_surfaces_api_error() {
    let (base_url, _) = spawn_server();
    let client = Client::builder(base_url)
        .session(Session::new(uuid::Uuid::new_v4(), "ab".repeat(32), "not.a.token"))
        .build()
        .unwrap();

    let err = client.entries().list().await.unwrap_err();

    match err {
        ClientError::Api { status, code, .. } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(code, error_codes::REFRESH_TOKEN_INVALID);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let (base_url, _) = spawn_server();
    let client = Client::builder(base_url).build().unwrap();
    register_and_login(&client, "erin@example.com").await;

    client.users().logout().await.unwrap();

    assert_eq!(client.session().await, Session::default());
    assert!(matches!(client.entries().list().await, Err(ClientError::NoSession)));
}
