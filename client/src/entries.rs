//! Secret entry endpoints

use reqwest::{Method, StatusCode};
use uuid::Uuid;

use crate::client::{decode, Client};
use crate::error::{ClientError, Result};
use crate::models::{CreateEntryRequest, Entry, EntryEnvelope, EntryList, RevealRequest, RevealedValue};

/// `/entries` and `/users/{id}/entries`
pub struct Entries<'a> {
    client: &'a Client,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Stores a secret for the logged in user
    pub async fn create(&self, request: &CreateEntryRequest) -> Result<Entry> {
        let response = self
            .client
            .send(Method::POST, "/entries", &[], Some(request))
            .await?;
        let envelope: EntryEnvelope = decode(response).await?;
        Ok(envelope.entry)
    }

    /// Entry metadata, or `None` when the id and nonce match no live entry
    pub async fn find(&self, id: Uuid, nonce: &str) -> Result<Option<Entry>> {
        let response = self
            .client
            .send::<()>(Method::GET, &format!("/entries/{}", id), &[("nonce", nonce)], None)
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: EntryEnvelope = decode(response).await?;
        Ok(Some(envelope.entry))
    }

    /// Reveals the plaintext, consuming the entry
    ///
    /// A wrong secret yields [`ClientError::Rejected`] with `expired` set once
    /// the entry has run out of attempts.
    pub async fn reveal(&self, id: Uuid, nonce: &str, secret: &str) -> Result<String> {
        let body = RevealRequest { nonce, secret };
        let response = self
            .client
            .send(Method::POST, &format!("/entries/{}/value", id), &[], Some(&body))
            .await?;
        let revealed: RevealedValue = decode(response).await?;
        Ok(revealed.value)
    }

    /// Entries sent by the logged in user
    pub async fn list(&self) -> Result<Vec<Entry>> {
        let user_id = self
            .client
            .session()
            .await
            .user_id
            .ok_or(ClientError::NoSession)?;

        let response = self
            .client
            .send::<()>(Method::GET, &format!("/users/{}/entries", user_id), &[], None)
            .await?;
        let list: EntryList = decode(response).await?;
        Ok(list.entries)
    }
}
