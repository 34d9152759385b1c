//! User and session endpoints

use reqwest::Method;

use crate::client::{decode, error_from, Client, Session, LOGIN_PATH};
use crate::error::{ClientError, Result};
use crate::models::{Credentials, CreateUserRequest, LoginResponse, LogoutRequest, User, UserEnvelope};

/// `/users`, `/login` and `/logout`
pub struct Users<'a> {
    client: &'a Client,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Registers a user; validation problems come back as [`ClientError::Rejected`]
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User> {
        let response = self
            .client
            .send(Method::POST, "/users", &[], Some(request))
            .await?;
        let envelope: UserEnvelope = decode(response).await?;
        Ok(envelope.user)
    }

    /// Logs in and stores the returned tokens as the client's session
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = Credentials { email, password };
        let response = self
            .client
            .send(Method::POST, LOGIN_PATH, &[], Some(&body))
            .await?;
        let login: LoginResponse = decode(response).await?;

        self.client
            .set_session(Session::new(
                login.user_id,
                login.refresh_token.token.clone(),
                login.access_token.token.clone(),
            ))
            .await;
        Ok(login)
    }

    /// Revokes the session's refresh token and forgets the session
    pub async fn logout(&self) -> Result<()> {
        let refresh_token = self
            .client
            .session()
            .await
            .refresh_token
            .ok_or(ClientError::NoSession)?;

        let body = LogoutRequest {
            refresh_token: &refresh_token,
        };
        let response = self
            .client
            .send(Method::POST, "/logout", &[], Some(&body))
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        self.client.set_session(Session::default()).await;
        Ok(())
    }
}
