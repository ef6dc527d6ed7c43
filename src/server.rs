//! Server assembly
//!
//! Builds the store and the services from `AppConfig` and runs the actix
//! HTTP server.

use crate::auth::JwtService;
use crate::config::{get_bind_address, mask_sensitive_url};
use crate::health::configure_health_routes;
use crate::media::{CloudinaryGateway, MediaGateway};
use crate::types::{AppConfig, DatabaseConfig, StartupError};
use crate::user::handlers::json_error_handler;
use crate::user::repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
use crate::user::routes::configure_user_routes;
use crate::user::service::UserService;
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

/// Routes and extractor configuration shared by the server and tests
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .configure(configure_health_routes)
        .configure(configure_user_routes);
}

/// Connects to Postgres and applies migrations, or falls back to memory
pub async fn build_repository(
    config: &DatabaseConfig,
) -> Result<Arc<dyn UserRepository>, StartupError> {
    let Some(url) = config.url.as_deref() else {
        log::warn!("DATABASE_URL not set, using the in-memory user store");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    };

    log::info!("Connecting to {}", mask_sensitive_url(url));
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StartupError::Migration(e.to_string()))?;

    Ok(Arc::new(PgUserRepository::new(pool)))
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);

    if origins.iter().any(|origin| origin == "*") {
        cors.allow_any_origin()
    } else {
        origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

/// Build everything from configuration and serve until shutdown
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let repo = build_repository(&config.database).await?;
    let jwt = Arc::new(JwtService::from_config(&config.jwt));
    let media: Arc<dyn MediaGateway> = Arc::new(CloudinaryGateway::new(config.media.clone()));

    let service = web::Data::new(UserService::new(repo, jwt, media));
    let upload = web::Data::new(config.upload.clone());
    let cors_origins = config.cors_origins.clone();

    let bind_address = get_bind_address(&config);
    log::info!("Starting server on {bind_address}");

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(build_cors(&cors_origins))
            .app_data(service.clone())
            .app_data(upload.clone())
            .configure(configure_app)
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .map_err(|e| StartupError::ServerBind(format!("{bind_address}: {e}")))?
        .run()
        .await
        .map_err(|e| StartupError::ServerBind(e.to_string()))
}
