//! # SendKey Client
//!
//! Typed HTTP client for the SendKey API. A [`Client`] keeps the caller's
//! session and exposes the user and entry endpoints through
//! [`Client::users`] and [`Client::entries`]. Requests rejected with 401 are
//! retried once after exchanging the refresh token for a new access token.

pub mod client;
pub mod entries;
pub mod error;
pub mod models;
pub mod users;

pub use client::{Client, ClientBuilder, Session};
pub use entries::Entries;
pub use error::{ClientError, Result};
pub use models::{CreateEntryRequest, CreateUserRequest, Entry, LoginResponse, Token, User};
pub use users::Users;
