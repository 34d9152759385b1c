//! Verification seam used by the HTTP layer

use uuid::Uuid;

use crate::errors::TokenError;

/// Checks access tokens without touching storage.
///
/// The middleware holds this as a trait object so it does not need to know
/// the repository type behind the token service.
pub trait AccessTokenVerifier: Send + Sync {
    /// Returns the user id carried by a valid token
    fn verify_access_token(&self, token: &str) -> Result<Uuid, TokenError>;
}
