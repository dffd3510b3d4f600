//! HopeLink backend — entry point.
//!
//! Composition root: loads configuration, builds the database pool and
//! adapters, wires the HTTP router, and serves until shutdown. The pool is
//! created once here and injected into every adapter; it is closed after
//! the server drains.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hopelink::adapters::http::donation::{api_router, DonationAppState};
use hopelink::adapters::postgres::{
    PostgresDonationRepository, PostgresProjectRepository, PostgresUserDirectory,
};
use hopelink::adapters::stripe::{StripeConfig, StripeGateway};
use hopelink::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    // Structured logging; RUST_LOG overrides the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if config.payment.is_test_mode() {
        tracing::warn!("Stripe is configured in test mode");
    }

    // One pool for the whole process, injected into every adapter
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let gateway = Arc::new(StripeGateway::new(StripeConfig::new(
        config.payment.stripe_api_key.clone(),
        config.payment.stripe_webhook_secret.clone(),
    )));

    let state = DonationAppState {
        donations: Arc::new(PostgresDonationRepository::new(pool.clone())),
        projects: Arc::new(PostgresProjectRepository::new(pool.clone())),
        users: Arc::new(PostgresUserDirectory::new(pool.clone())),
        gateway,
        public_base_url: config.server.public_base_url.clone(),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .with_state(state);

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "HopeLink backend listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server drained, closing database pool");
    pool.close().await;

    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed: Vec<_> = origins
        .iter()
        .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::list(parsed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
