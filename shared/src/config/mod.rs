//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing and password hashing
//! - `database` - Database connection and pool configuration
//! - `entries` - Secret entry encryption, attempt limit and cleanup
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and CORS configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `SENDKEY__SECTION__KEY` environment variables.

pub mod auth;
pub mod database;
pub mod entries;
pub mod environment;
pub mod server;

use std::path::Path;

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig};
pub use database::DatabaseConfig;
pub use entries::EntryConfig;
pub use environment::{Environment, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config/sendkey.toml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_FILE_ENV: &str = "SENDKEY_CONFIG";

const ENV_PREFIX: &str = "SENDKEY";
const ENV_SEPARATOR: &str = "__";
const LIST_KEYS: [&str; 3] = [
    "server.cors.allowed_origins",
    "server.cors.allowed_methods",
    "server.cors.allowed_headers",
];

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Secret entry configuration
    pub entries: EntryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `.env`, the configuration file and the
    /// process environment, then validate it.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development
        let _ = dotenvy::dotenv();

        let path = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let config = Self::load_from(Path::new(&path))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional file plus environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(environment_source());

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Parse configuration from a TOML document, without environment overrides.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check every setting and report all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.entries.encryption_key.is_empty() {
            problems.push("entries.encryption_key must not be empty".to_string());
        }
        if self.entries.max_invalid_attempts < 1 {
            problems.push("entries.max_invalid_attempts must be at least 1".to_string());
        }
        if self.entries.max_value_bytes == 0 {
            problems.push("entries.max_value_bytes must be greater than 0".to_string());
        }
        if self.entries.cleanup_enabled && self.entries.cleanup_interval_seconds == 0 {
            problems.push("entries.cleanup_interval_seconds must be greater than 0".to_string());
        }
        if self.auth.jwt.secret.is_empty() {
            problems.push("auth.jwt.secret must not be empty".to_string());
        }
        if self.auth.jwt.access_token_expiry_minutes <= 0 {
            problems.push("auth.jwt.access_token_expiry_minutes must be greater than 0".to_string());
        }
        if self.auth.jwt.refresh_token_expiry_hours <= 0 {
            problems.push("auth.jwt.refresh_token_expiry_hours must be greater than 0".to_string());
        }
        if !self.auth.has_valid_bcrypt_cost() {
            problems.push("auth.bcrypt_cost must be between 4 and 31".to_string());
        }
        if self.database.url.is_empty() {
            problems.push("database.url must not be empty".to_string());
        }

        if self.environment.is_production() {
            if self.auth.jwt.is_using_default_secret() {
                problems.push("auth.jwt.secret must be changed in production".to_string());
            }
            if self.entries.is_using_default_key() {
                problems.push("entries.encryption_key must be changed in production".to_string());
            }
            if self.entries.console_notifications {
                problems.push("entries.console_notifications must be off in production".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

fn environment_source() -> config::Environment {
    LIST_KEYS.iter().fold(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(","),
        |source, key| source.with_list_parse_key(key),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.entries.max_invalid_attempts, 3);
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = AppConfig::from_toml(
            r#"
            environment = "staging"

            [server]
            port = 9000

            [entries]
            max_invalid_attempts = 5

            [auth.jwt]
            access_token_expiry_minutes = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.entries.max_invalid_attempts, 5);
        assert_eq!(config.auth.jwt.access_token_expiry_minutes, 5);
        assert_eq!(config.auth.jwt.refresh_token_expiry_hours, 168);
    }

    #[test]
    fn test_validation_lists_every_problem() {
        let mut config = AppConfig::default();
        config.entries.encryption_key.clear();
        config.entries.max_invalid_attempts = 0;
        config.auth.jwt.access_token_expiry_minutes = 0;

        match config.validate() {
            Err(ConfigError::Invalid(problems)) => assert_eq!(problems.len(), 3),
            other => panic!("expected validation problems, got {:?}", other),
        }
    }

    #[test]
    fn test_production_rejects_development_secrets() {
        let config = AppConfig {
            environment: Environment::Production,
            ..Default::default()
        };

        match config.validate() {
            Err(ConfigError::Invalid(problems)) => {
                assert!(problems.iter().any(|p| p.contains("auth.jwt.secret")));
                assert!(problems.iter().any(|p| p.contains("entries.encryption_key")));
            }
            other => panic!("expected validation problems, got {:?}", other),
        }
    }
}
