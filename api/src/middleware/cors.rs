//! CORS middleware configuration for cross-origin requests.
//!
//! Built from [`CorsConfig`]; `*` in any list opens that dimension fully.
//! Entries that do not parse as a method or header name are skipped with a
//! warning instead of failing startup.

use actix_cors::Cors;
use actix_web::http::{header::HeaderName, Method};
use sk_shared::config::CorsConfig;

/// Creates a CORS middleware instance from configuration
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default().max_age(config.max_age_seconds);

    if config.allows_any_origin() {
        cors = cors.allow_any_origin();
    } else {
        for origin in config.allowed_origins.iter().map(|o| o.trim()).filter(|o| !o.is_empty()) {
            log::info!("Adding allowed origin: {}", origin);
            cors = cors.allowed_origin(origin);
        }
    }

    if config.allowed_methods.iter().any(|m| m == "*") {
        cors = cors.allow_any_method();
    } else {
        cors = cors.allowed_methods(parse_methods(&config.allowed_methods));
    }

    if config.allowed_headers.iter().any(|h| h == "*") {
        cors = cors.allow_any_header();
    } else {
        cors = cors.allowed_headers(parse_headers(&config.allowed_headers));
    }

    cors
}

fn parse_methods(methods: &[String]) -> Vec<Method> {
    methods
        .iter()
        .filter_map(|m| match Method::from_bytes(m.trim().to_uppercase().as_bytes()) {
            Ok(method) => Some(method),
            Err(_) => {
                log::warn!("Ignoring invalid CORS method: {}", m);
                None
            }
        })
        .collect()
}

fn parse_headers(headers: &[String]) -> Vec<HeaderName> {
    headers
        .iter()
        .filter_map(|h| match HeaderName::from_bytes(h.trim().as_bytes()) {
            Ok(name) => Some(name),
            Err(_) => {
                log::warn!("Ignoring invalid CORS header: {}", h);
                None
            }
        })
        .collect()
}
