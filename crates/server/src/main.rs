use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use travelpair_core::{
    load_config, seed_providers, validate_config, ProviderStore, SearchService, SearchStore,
    SqliteProviderStore, SqliteSearchStore,
};
use travelpair_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("TravelPair {}", VERSION);

    // Determine config path
    let config_path = std::env::var("TRAVELPAIR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Create SQLite provider store
    let provider_store: Arc<dyn ProviderStore> = Arc::new(
        SqliteProviderStore::new(&config.database.path)
            .context("Failed to create provider store")?,
    );
    let seeded = seed_providers(provider_store.as_ref(), &config.providers)
        .context("Failed to seed providers")?;
    if seeded > 0 {
        info!("Registered {} providers from configuration", seeded);
    }
    info!("Provider store initialized");

    // Create SQLite search store
    let search_store: Arc<dyn SearchStore> = Arc::new(
        SqliteSearchStore::new(&config.database.path).context("Failed to create search store")?,
    );
    info!("Search store initialized");

    if config.search.seed.is_some() {
        info!("Offer synthesis seeded from configuration");
    }
    let service = Arc::new(SearchService::new(
        Arc::clone(&provider_store),
        search_store,
        config.search.synthesis.clone(),
        config.search.seed,
    ));

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), provider_store, service));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
