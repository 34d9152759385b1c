//! Application factory
//!
//! Builds the Actix-web application from already constructed services so the
//! binary and the integration tests share one routing table.
//!
//! Access tokens are checked per resource: required on logout, entry
//! creation and listing, optional on find and reveal, ignored on the session
//! endpoints so an expired token never blocks `/token`.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web, App, HttpResponse,
};

use sk_core::repositories::{EntryRepository, TokenRepository, UserRepository};
use sk_core::services::entry::EntryNotifier;
use sk_core::services::token::AccessTokenVerifier;
use sk_shared::config::ServerConfig;
use sk_shared::errors::{error_codes, ErrorResponse};

use crate::handlers::error::json_error_handler;
use crate::middleware::{auth::JwtAuth, cors::create_cors};
use crate::routes::{entries, users, AppState};

/// Create and configure the application with all dependencies
pub fn create_app<E, N, T, U>(
    app_state: web::Data<AppState<E, N, T, U>>,
    server: &ServerConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    let verifier: Arc<dyn AccessTokenVerifier> = app_state.token_service.clone();
    let json_config = web::JsonConfig::default()
        .limit(server.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        // Last registered is outermost
        .wrap(Logger::default())
        .wrap(create_cors(&server.cors))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                // Session endpoints take no access token
                .route("/users", web::post().to(users::create_user::<E, N, T, U>))
                .route("/login", web::post().to(users::login::<E, N, T, U>))
                .route("/token", web::post().to(users::refresh_token::<E, N, T, U>))
                .service(
                    web::resource("/logout")
                        .route(web::post().to(users::logout::<E, N, T, U>))
                        .wrap(JwtAuth::required(verifier.clone())),
                )
                .service(
                    web::resource("/users/{id}/entries")
                        .route(web::get().to(entries::list_user_entries::<E, N, T, U>))
                        .wrap(JwtAuth::required(verifier.clone())),
                )
                .service(
                    web::resource("/entries")
                        .route(web::post().to(entries::create_entry::<E, N, T, U>))
                        .wrap(JwtAuth::required(verifier.clone())),
                )
                .service(
                    web::resource("/entries/{id}")
                        .route(web::get().to(entries::find_entry::<E, N, T, U>))
                        .wrap(JwtAuth::optional(verifier.clone())),
                )
                .service(
                    web::resource("/entries/{id}/value")
                        .route(web::post().to(entries::reveal_entry::<E, N, T, U>))
                        .wrap(JwtAuth::optional(verifier)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "sendkey-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
