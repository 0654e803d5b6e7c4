//! brawl-analytics server entry point.
//!
//! Loads configuration, opens storage, seeds the brawler catalog and serves
//! the REST API.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use brawl_analytics::api;
use brawl_analytics::app_state::AppState;
use brawl_analytics::config::{AnalyticsConfig, LogFormat};
use brawl_analytics::fetch::{BrawlApiClient, Fetcher};
use brawl_analytics::persistence::{MemoryStorage, PostgresStorage, Storage};
use brawl_analytics::service::{PlayerService, SyncSettings, seed_brawler_catalog};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AnalyticsConfig::from_env().context("invalid LISTEN_ADDR")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting brawl-analytics");

    // Build storage
    let storage: Arc<dyn Storage> = if config.persistence_enabled {
        let postgres = PostgresStorage::connect(&config)
            .await
            .context("failed to open the database")?;
        tracing::info!("using PostgreSQL storage");
        Arc::new(postgres)
    } else {
        tracing::warn!("persistence disabled, using in-memory storage");
        Arc::new(MemoryStorage::new())
    };

    // Build the external API client
    if config.brawl_api_token.is_none() {
        tracing::warn!("BRAWL_API_TOKEN not set, external requests are unauthenticated");
    }
    let fetcher: Arc<dyn Fetcher> = Arc::new(
        BrawlApiClient::new(
            config.brawl_api_base_url.clone(),
            config.brawl_api_token.clone(),
            config.brawl_api_rate_limit_per_second,
            config.brawl_api_timeout(),
        )
        .context("failed to build the HTTP client")?,
    );

    // Seed the brawler catalog
    if let Err(e) = seed_brawler_catalog(fetcher.as_ref(), storage.as_ref()).await {
        tracing::error!(error = %e, "brawler catalog seeding failed");
    }

    // Build service layer
    let player_service = Arc::new(PlayerService::new(
        fetcher,
        storage,
        SyncSettings::from(&config),
    ));
    let app_state = AppState::new(player_service);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
