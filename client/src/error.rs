//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`crate::Client`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or an undecodable success body
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The call needs a logged in session
    #[error("No active session")]
    NoSession,

    /// 400 answer listing every problem; `expired` is set when a reveal used
    /// up the entry's last attempt
    #[error("Request rejected: {}", .errors.join(" "))]
    Rejected { errors: Vec<String>, expired: bool },

    /// Any other non-success answer
    #[error("API error [{status}] {code}: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
}

impl ClientError {
    /// HTTP status of the answer, when the server sent one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(e) => e.status(),
            Self::Rejected { .. } => Some(StatusCode::BAD_REQUEST),
            Self::Api { status, .. } => Some(*status),
            Self::InvalidBaseUrl(_) | Self::NoSession => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
