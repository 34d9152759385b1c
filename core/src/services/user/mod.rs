//! User account service: registration, credential checks and lookups

mod config;
mod service;


pub use config::UserServiceConfig;
pub use service::{messages, CreateUserRequest, UserService};
