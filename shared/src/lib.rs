//! Shared utilities and common types for the SendKey server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types and the layered configuration loader
//! - Error response structures
//! - Utility functions (email masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, CorsConfig, DatabaseConfig, EntryConfig, Environment,
    JwtConfig, LoggingConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse, ValidationFailure};
pub use utils::email;
