//! Token service module for JWT management
//!
//! This module handles:
//! - HS256 access token issuing and verification
//! - Opaque refresh tokens stored as hashes
//! - Refresh token revocation and expiry cleanup

mod config;
mod service;
mod verifier;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use service::TokenService;
pub use verifier::AccessTokenVerifier;
