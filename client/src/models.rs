//! Wire models of the SendKey API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at_utc: DateTime<Utc>,
}

/// Token and its expiry in unix seconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    pub token: String,
    pub expires: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub access_token: Token,
    pub refresh_token: Token,
}

/// New secret; `duration` is in minutes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub name: String,
    pub send_to_email: String,
    pub value: String,
    pub secret: String,
    pub duration: i64,
}

/// Entry metadata as served by the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: Uuid,
    pub name: String,
    pub sent_by_user_id: Uuid,
    pub sent_to_email: String,
    pub created_at_utc: DateTime<Utc>,
    pub expires_at_utc: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntryEnvelope {
    pub entry: Entry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntryList {
    pub entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevealedValue {
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub user_id: Uuid,
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LogoutRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RevealRequest<'a> {
    pub nonce: &'a str,
    pub secret: &'a str,
}

/// Body of a 400 answer
#[derive(Debug, Deserialize)]
pub(crate) struct Failure {
    pub errors: Vec<String>,
    #[serde(default)]
    pub expired: bool,
}

/// Body of every other error answer
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub message: String,
}
