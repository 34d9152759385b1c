use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sk_core::domain::entities::entry::Entry;

/// Body of `POST /api/v1/entries`; `duration` is in minutes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEntryRequest {
    pub name: String,
    pub send_to_email: String,
    pub value: String,
    pub secret: String,
    pub duration: i64,
}

/// Query string of `GET /api/v1/entries/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NonceQuery {
    pub nonce: String,
}

/// Body of `POST /api/v1/entries/{id}/value`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RevealRequest {
    pub nonce: String,
    pub secret: String,
}

/// Entry metadata; the nonce and ciphertext stay on the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub id: Uuid,
    pub name: String,
    pub sent_by_user_id: Uuid,
    pub sent_to_email: String,
    pub created_at_utc: DateTime<Utc>,
    pub expires_at_utc: DateTime<Utc>,
}

impl From<&Entry> for EntryResponse {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            sent_by_user_id: entry.sent_by_user_id,
            sent_to_email: entry.sent_to_email.clone(),
            created_at_utc: entry.created_at,
            expires_at_utc: entry.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryEnvelope {
    pub success: bool,
    pub entry: EntryResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryListResponse {
    pub success: bool,
    pub entries: Vec<EntryResponse>,
}

/// Revealed plaintext; lossy for values that are not UTF-8
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealResponse {
    pub success: bool,
    pub value: String,
}

/// Failed reveal; `expired` is set when this attempt used up the last guess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealFailure {
    pub success: bool,
    pub errors: Vec<String>,
    pub expired: bool,
}
