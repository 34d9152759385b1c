//! Authentication and authorization configuration

use serde::{Deserialize, Serialize};

const DEFAULT_JWT_SECRET: &str = "sendkey-development-secret-change-me";

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Access and refresh token settings
    pub jwt: JwtConfig,

    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            bcrypt_cost: 12,
        }
    }
}

impl AuthConfig {
    /// Range of work factors bcrypt accepts
    pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

    /// Whether the configured cost is usable by bcrypt
    pub fn has_valid_bcrypt_cost(&self) -> bool {
        Self::BCRYPT_COST_RANGE.contains(&self.bcrypt_cost)
    }
}

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HMAC key used to sign access tokens
    pub secret: String,

    /// Access token lifetime in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token lifetime in hours
    pub refresh_token_expiry_hours: i64,

    /// JWT issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_hours: 24 * 7,
            issuer: String::from("sendkey"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Access token lifetime in seconds
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_expiry_seconds(&self) -> i64 {
        self.refresh_token_expiry_hours * 3600
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}
