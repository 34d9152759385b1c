//! Session-aware HTTP transport shared by the resources.

use std::time::Duration;

use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entries::Entries;
use crate::error::{ClientError, Result};
use crate::models::{ErrorBody, Failure, RefreshRequest, Token};
use crate::users::Users;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) const LOGIN_PATH: &str = "/login";
pub(crate) const TOKEN_PATH: &str = "/token";

/// Credentials of the logged in user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<Uuid>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(user_id: Uuid, refresh_token: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    base_url: String,
    http: Option<reqwest::Client>,
    default_headers: HeaderMap,
    timeout: Duration,
    session: Session,
}

impl ClientBuilder {
    /// `base_url` includes the API prefix, e.g. `https://sendkey.example/api/v1`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: None,
            default_headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            session: Session::default(),
        }
    }

    /// Uses a preconfigured reqwest client; the timeout setting is then ignored
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Headers added to every request
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resumes an existing session
    pub fn session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn build(self) -> Result<Client> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(self.base_url));
        }

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder().timeout(self.timeout).build()?,
        };

        tracing::debug!(base_url = %base_url, "SendKey client initialized");

        Ok(Client {
            base_url,
            http,
            default_headers: self.default_headers,
            session: RwLock::new(self.session),
        })
    }
}

/// Client for the SendKey API
pub struct Client {
    base_url: String,
    http: reqwest::Client,
    default_headers: HeaderMap,
    session: RwLock<Session>,
}

impl Client {
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn entries(&self) -> Entries<'_> {
        Entries::new(self)
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub(crate) async fn set_session(&self, session: Session) {
        *self.session.write().await = session;
    }

    /// Exchanges the refresh token for a new access token and stores it
    pub async fn refresh_access_token(&self) -> Result<Token> {
        let (user_id, refresh_token) = {
            let session = self.session.read().await;
            match (session.user_id, session.refresh_token.clone()) {
                (Some(user_id), Some(refresh_token)) => (user_id, refresh_token),
                _ => return Err(ClientError::NoSession),
            }
        };

        let body = RefreshRequest {
            user_id,
            refresh_token: &refresh_token,
        };
        let response = self.execute(&Method::POST, TOKEN_PATH, &[], Some(&body)).await?;
        let token: Token = decode(response).await?;

        self.session.write().await.access_token = Some(token.token.clone());
        Ok(token)
    }

    /// Sends a request, refreshing the access token and retrying once on 401
    pub(crate) async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let response = self.execute(&method, path, query, body).await?;
        if response.status() != StatusCode::UNAUTHORIZED || is_session_path(path) {
            return Ok(response);
        }
        if self.session.read().await.refresh_token.is_none() {
            return Ok(response);
        }

        tracing::debug!(path, "Access token rejected, refreshing");
        self.refresh_access_token().await?;
        self.execute(&method, path, query, body).await
    }

    async fn execute<B>(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, path))
            .headers(self.default_headers.clone())
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if !is_session_path(path) {
            if let Some(token) = self.session.read().await.access_token.as_deref() {
                request = request.bearer_auth(token);
            }
        }

        tracing::debug!(%method, path, "Sending request");
        Ok(request.send().await?)
    }
}

/// Login and refresh never carry or refresh an access token
fn is_session_path(path: &str) -> bool {
    path == LOGIN_PATH || path == TOKEN_PATH
}

/// Decodes a success body or turns the answer into a [`ClientError`]
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(error_from(response).await)
}

pub(crate) async fn error_from(response: Response) -> ClientError {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return e.into(),
    };

    if status == StatusCode::BAD_REQUEST {
        if let Ok(failure) = serde_json::from_str::<Failure>(&text) {
            return ClientError::Rejected {
                errors: failure.errors,
                expired: failure.expired,
            };
        }
    }

    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => ClientError::Api {
            status,
            code: body.error,
            message: body.message,
        },
        Err(_) => ClientError::Api {
            status,
            code: String::new(),
            message: text,
        },
    }
}
