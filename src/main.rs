use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use lecturehall_api::api::build_router;
use lecturehall_api::config::{AppConfig, StoreBackend};
use lecturehall_api::infrastructure::mail::mailer_from_config;
use lecturehall_api::infrastructure::repositories::InMemoryStore;
use lecturehall_api::logging::init_logging;
use lecturehall_api::state::{AppState, Stores};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    init_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let stores = match config.store {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Database connected successfully");

            if config.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .expect("Failed to run migrations");
                tracing::info!("Migrations applied");
            }

            Stores::postgres(pool)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on shutdown");
            Stores::in_memory(Arc::new(InMemoryStore::new()))
        }
    };

    let mailer = mailer_from_config(&config.mail);
    let addr = config.bind_addr;
    let app = build_router(AppState::new(stores, config, mailer));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
