//! Configuration for the user service

use sk_shared::config::AuthConfig;

/// Configuration for the user service
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Shortest password accepted at registration
    pub min_password_length: usize,
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            min_password_length: 8,
        }
    }
}

impl From<&AuthConfig> for UserServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            bcrypt_cost: config.bcrypt_cost,
            ..Default::default()
        }
    }
}
