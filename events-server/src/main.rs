//! `ghevents-web`: GitHub webhook ingestion server.
//!
//! Owns the process-wide [`EventStore`]: it is opened (and migrated) before
//! the listener binds, handed to every handler through [`AppState`], and
//! closed only after the server has drained on SIGINT/SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ghevents::{router, AppState, Config, EventStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        database_max_connections = config.database_max_connections,
        recent_window_secs = config.recent_window.as_secs(),
        max_body_bytes = config.max_body_bytes,
        "config_loaded"
    );

    // One pool for the whole process; handlers share clones of it
    let store = EventStore::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to open event store")?;

    let state = AppState::new(config.clone(), store.clone());
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Every handler has returned by now, so closing cannot cut off an insert
    store.close().await;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM. Axum then stops accepting connections and
/// drains in-flight deliveries, so no insert races the store being closed.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "sigint_handler_unavailable");
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
                warn!(error = %e, "sigterm_handler_unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    info!(signal = received, "web_server_draining");
}
