//! Ticketing backend HTTP server.
//!
//! Binds the axum router over either the PostgreSQL store (when
//! `DATABASE_URL` is set) or the in-memory store.

use boxoffice::clock::SystemClock;
use boxoffice::config::Config;
use boxoffice::server::{build_router, AppState};
use boxoffice::store::{postgres::PgStore, Stores};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,boxoffice=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ticketing backend");

    // Load configuration
    let config = Config::from_env();

    // Select the store backend
    let stores = match &config.database.url {
        Some(url) => {
            info!("Connecting to PostgreSQL...");
            let store = PgStore::connect(
                url,
                config.database.max_connections,
                config.database.connect_timeout,
            )
            .await?;
            info!("Database connected");
            Stores::postgres(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set; running on the in-memory store");
            Stores::in_memory()
        }
    };

    let state = AppState::new(&stores, Arc::new(SystemClock), &config);
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install Ctrl+C handler");
    }
}
