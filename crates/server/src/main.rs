use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flickvault_core::{
    catalog::import_seed_file, config::LogFormat, load_config, validate_config, AccountService,
    Authenticator, CatalogStore, DisabledTrendingFeed, JwtAuthenticator, SqliteCatalog,
    SqliteTrendingStore, SqliteUserStore, TmdbClient, TokenManager, TrendingCache, TrendingFeed,
    TrendingSettings, TrendingStore, UserStore,
};
use flickvault_server::api::create_router;
use flickvault_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Logging may not be initialized yet
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init(),
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("FLICKVAULT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    init_tracing(config.logging.format);
    info!(version = VERSION, "Loaded configuration from {:?}", config_path);

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(config_hash = &config_hash[..16], "Configuration validated");
    info!("Database path: {:?}", config.database.path);

    // Stores share one SQLite file
    let catalog: Arc<dyn CatalogStore> = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to create catalog store")?,
    );
    let users: Arc<dyn UserStore> = Arc::new(
        SqliteUserStore::new(&config.database.path).context("Failed to create user store")?,
    );
    let trending_store: Arc<dyn TrendingStore> = Arc::new(
        SqliteTrendingStore::new(&config.database.path)
            .context("Failed to create trending store")?,
    );
    info!("Stores initialized");

    // Seed the catalog if configured
    if let Some(seed_file) = &config.catalog.seed_file {
        if seed_file.exists() {
            let summary = import_seed_file(catalog.as_ref(), seed_file)?;
            info!(
                movies = summary.movies,
                shows = summary.shows,
                "Catalog seeded from {:?}",
                seed_file
            );
        } else {
            warn!("Catalog seed file {:?} does not exist, skipping", seed_file);
        }
    }

    // Authentication
    let tokens =
        Arc::new(TokenManager::from_config(&config.auth).context("Failed to create token manager")?);
    let authenticator: Arc<dyn Authenticator> =
        Arc::new(JwtAuthenticator::new(Arc::clone(&tokens), Arc::clone(&users)));
    let accounts = Arc::new(AccountService::new(Arc::clone(&users), tokens));
    info!("Using authenticator: {}", authenticator.method_name());

    // Trending feed
    let feed: Arc<dyn TrendingFeed> = match &config.tmdb {
        Some(tmdb_config) => {
            info!("Initializing TMDB client");
            Arc::new(TmdbClient::new(tmdb_config).context("Failed to create TMDB client")?)
        }
        None => {
            warn!("TMDB not configured, trending refreshes will fail");
            Arc::new(DisabledTrendingFeed)
        }
    };

    let trending = Arc::new(TrendingCache::new(
        feed,
        Arc::clone(&catalog),
        Arc::clone(&trending_store),
        TrendingSettings::from(&config.trending),
    ));

    // Background refresher
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let refresher = config.trending.background_refresh_secs.map(|secs| {
        Arc::clone(&trending).spawn_refresher(Duration::from_secs(secs), shutdown_tx.subscribe())
    });

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        catalog,
        users,
        accounts,
        trending,
        trending_store,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutting down...");

    // Stop the refresher if running
    if let Some(handle) = refresher {
        let _ = shutdown_tx.send(());
        let _ = handle.await;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
