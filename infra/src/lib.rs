//! # Infrastructure Layer
//!
//! Concrete implementations of the `sk_core` repository and notifier traits:
//!
//! - **Database**: MySQL connection pool, migrations and repositories using SQLx
//! - **Notification**: recipient notifier that logs delivery of entry links
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Notification module - recipient delivery of entry links
pub mod notification;

mod errors;

pub use errors::InfrastructureError;

#[cfg(feature = "mysql")]
pub use database::{
    DatabasePool, MySqlEntryRepository, MySqlTokenRepository, MySqlUserRepository, PoolStatistics,
};
pub use notification::LogEntryNotifier;
