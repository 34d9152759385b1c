//! Request and response bodies of the HTTP API

pub mod auth_dto;
pub mod entry_dto;

pub use auth_dto::*;
pub use entry_dto::*;
pub use sk_shared::errors::{ErrorResponse, ValidationFailure};
