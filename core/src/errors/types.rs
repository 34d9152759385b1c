//! Domain-specific error types for authentication and token handling.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are not told apart
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("An account with the specified email already exists.")]
    UserAlreadyExists,
}

/// Token-related errors
///
/// Each verification failure has its own stable variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("No token provided")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid token claims")]
    InvalidClaims,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

impl TokenError {
    /// Stable machine-readable reason
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::MissingToken => "missing_token",
            TokenError::TokenExpired => "token_expired",
            TokenError::InvalidTokenFormat => "invalid_token_format",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::InvalidClaims => "invalid_claims",
            TokenError::RefreshTokenExpired => "refresh_token_expired",
            TokenError::InvalidRefreshToken => "invalid_refresh_token",
            TokenError::TokenGenerationFailed => "token_generation_failed",
        }
    }
}
