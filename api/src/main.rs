use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use log::{info, warn};

use sk_api::{create_app, AppState};
use sk_core::services::{
    CleanupConfig, CleanupService, EntryService, EntryServiceConfig, TokenService,
    TokenServiceConfig, UserService, UserServiceConfig,
};
use sk_infra::{
    DatabasePool, LogEntryNotifier, MySqlEntryRepository, MySqlTokenRepository,
    MySqlUserRepository,
};
use sk_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    let filter = config.logging.filter_for(config.environment);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    info!(
        "Starting SendKey API Server ({:?} environment)",
        config.environment
    );
    if config.auth.jwt.is_using_default_secret() {
        warn!("JWT secret is the built-in default; set SENDKEY__AUTH__JWT__SECRET");
    }
    if config.entries.is_using_default_key() {
        warn!("Entry encryption key is the built-in default; set SENDKEY__ENTRIES__ENCRYPTION_KEY");
    }

    let database = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to the database")?;
    if config.database.run_migrations {
        database
            .run_migrations()
            .await
            .context("failed to run database migrations")?;
    }
    info!("Database ready: {}", database.get_statistics());

    let pool = database.get_pool().clone();
    let entry_service = Arc::new(EntryService::new(
        MySqlEntryRepository::new(pool.clone()),
        LogEntryNotifier::from_config(&config.entries),
        EntryServiceConfig::from(&config.entries),
    ));
    let token_service = Arc::new(TokenService::new(
        MySqlTokenRepository::new(pool.clone()),
        TokenServiceConfig::from(&config.auth.jwt),
    ));
    let user_service = Arc::new(UserService::new(
        MySqlUserRepository::new(pool),
        UserServiceConfig::from(&config.auth),
    ));

    let cleanup = Arc::new(CleanupService::new(
        entry_service.clone(),
        token_service.clone(),
        CleanupConfig::from(&config.entries),
    ));
    let cleanup_task = cleanup.start_background_task();

    let app_state = web::Data::new(AppState::new(entry_service, token_service, user_service));
    let server_config = config.server.clone();
    let bind_address = server_config.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(app_state.clone(), &server_config));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server terminated with an error")?;

    if let Some(task) = cleanup_task {
        task.abort();
    }
    database.close().await;
    info!("SendKey API Server stopped");

    Ok(())
}
