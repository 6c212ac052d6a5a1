use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use leasecalc_backend::app;
use leasecalc_backend::config::{AppConfig, StoreBackend};
use leasecalc_backend::logging::{self, LoggingConfig};
use leasecalc_backend::state::AppState;
use leasecalc_backend::store::{InMemoryQuoteStore, PgQuoteStore, QuoteStore};

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn QuoteStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(config.db_acquire_timeout)
                .connect(database_url)
                .await
                .context("Failed to connect to PostgreSQL")?;

            let store = PgQuoteStore::new(pool);
            if config.run_migrations {
                store.migrate().await.context("Failed to run migrations")?;
            }
            info!("Using PostgreSQL quote store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory quote store; quotes are lost on restart");
            Ok(Arc::new(InMemoryQuoteStore::new()))
        }
    }
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let origin = HeaderValue::from_str(origin).context("CORS_ALLOW_ORIGIN is not a valid header value")?;
    Ok(layer.allow_origin(origin))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_logging(LoggingConfig::from_env())?;
    let config = AppConfig::from_env().context("Invalid configuration")?;

    let store = build_store(&config).await?;
    let state = AppState {
        store,
        verify_derived_fields: config.verify_derived_fields,
    };
    if state.verify_derived_fields {
        info!("Derived quote fields are verified server-side");
    }

    let mut app = app::create_app(state);
    if let Some(origin) = config.cors_allow_origin.as_deref() {
        app = app.layer(cors_layer(origin)?);
    }

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Finance quote service listening on http://{}/", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
