//! Notion Search Cache - expiring cache tier for a Notion search front-end
//!
//! Serves the cache registry over HTTP and keeps it swept in the background.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notion_search_cache::api::create_router;
use notion_search_cache::tasks::{spawn_sweeper, SweeperHandle};
use notion_search_cache::{AppState, Config};

/// Main entry point for the cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache registry (and preloader, if an upstream is set)
/// 4. Start the background sweeper
/// 5. Serve HTTP until SIGINT/SIGTERM, then stop the sweeper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notion_search_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Notion search cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, sweep_interval={}s, soft_limit={}, target_size={}, preload_concurrency={}",
        config.server_port,
        config.sweep_interval,
        config.soft_limit,
        config.target_size,
        config.preload_concurrency
    );

    let state = AppState::from_config(&config);
    match &config.upstream_url {
        Some(url) => info!("Page preloading enabled from {}", url),
        None => warn!("UPSTREAM_URL not set, page preloading disabled"),
    }

    let sweeper = spawn_sweeper(
        state.cache.clone(),
        Duration::from_secs(config.sweep_interval.max(1)),
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    stop_sweeper(sweeper).await;
    info!("Server shutdown complete");
    Ok(())
}

async fn stop_sweeper(sweeper: SweeperHandle) {
    sweeper.shutdown().await;
    info!("Cache sweeper shut down");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
