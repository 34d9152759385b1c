//! HTTP API for SendKey
//!
//! Exposes the application factory and its parts so the binary and the
//! integration tests build the same app.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::create_app;
pub use routes::AppState;
