pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::Services;
use config::Config;
use domain::errors::DomainError;
use infrastructure::memory::InMemoryStore;
use infrastructure::simulated_gateway::SimulatedGateway;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DomainError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DomainError::Persistence(format!("migrations failed: {e}")))?;
    Ok(())
}

/// Wires the service graph for `config`: PostgreSQL when a database URL is
/// configured (migrating it first), the in-memory store otherwise.
pub fn build_services(config: &Config) -> Result<Services, DomainError> {
    let repos = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url)?;
            run_migrations(&pool)?;
            infrastructure::diesel_repositories(pool)
        }
        None => {
            log::warn!("DATABASE_URL not set; orders are kept in memory only");
            InMemoryStore::new().repositories()
        }
    };
    Ok(Services::new(
        repos,
        Arc::new(SimulatedGateway::new(config.payment_success_rate)),
        config.low_stock_threshold,
    ))
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    services: Services,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let services = web::Data::new(services);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(services.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", handlers::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
