//! mlib-api - Song catalog HTTP service
//!
//! Startup sequence:
//! 1. `.env` file (it may carry `RUST_LOG`)
//! 2. Tracing, then environment configuration (fatal on error)
//! 3. PostgreSQL pool with bounded reconnect, ping, schema bootstrap
//! 4. Router and HTTP listener
//!
//! On SIGINT/SIGTERM the listener stops accepting connections and in-flight
//! requests get a fixed grace window before the process exits.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use mlib_api::repository::PgSongRepository;
use mlib_api::services::HttpEnrichmentClient;
use mlib_api::{build_router, log_filter, AppState};
use mlib_common::config::{load_env_file, ServiceConfig};
use mlib_common::db::{init_database, redacted_url};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long in-flight requests may run after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Command-line arguments for mlib-api
#[derive(Parser, Debug)]
#[command(name = "mlib-api")]
#[command(about = "Song catalog HTTP service")]
#[command(version)]
struct Args {
    /// Env file loaded before reading configuration
    #[arg(long, default_value = ".env", env = "MLIB_ENV_FILE")]
    env_file: PathBuf,

    /// Address to bind (the port comes from PORT)
    #[arg(long, default_value = "0.0.0.0", env = "MLIB_HOST")]
    host: IpAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The env file may set RUST_LOG, so it is read before the subscriber
    let env_file = load_env_file(&args.env_file);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting mlib-api v{}", env!("CARGO_PKG_VERSION"));

    if env_file.context("Failed to load env file")? {
        info!("Loaded environment from {}", args.env_file.display());
    } else {
        debug!(
            "No env file at {}, using process environment only",
            args.env_file.display()
        );
    }

    let config = ServiceConfig::from_env().context("Invalid configuration")?;

    info!("Database: {}", redacted_url(&config.database));

    let pool = init_database(&config.database)
        .await
        .context("Failed to initialize database")?;

    let songs = Arc::new(PgSongRepository::new(pool.clone()));
    let enricher = Arc::new(
        HttpEnrichmentClient::new(&config.enrichment)
            .context("Failed to build enrichment client")?,
    );
    info!("Enrichment service: {}", enricher.api_url());

    let app = build_router(AppState::new(songs, enricher));

    let addr = SocketAddr::new(args.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    let shutdown = CancellationToken::new();
    let mut server = tokio::spawn({
        let token = shutdown.clone();
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await
        }
    });

    tokio::select! {
        result = &mut server => {
            // Server exited without a shutdown signal
            return match result {
                Ok(served) => served.context("Server error"),
                Err(e) => Err(e).context("Server task failed"),
            };
        }
        _ = shutdown_signal() => {}
    }

    shutdown.cancel();

    match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
        Ok(Ok(Ok(()))) => info!("Server shutdown complete"),
        Ok(Ok(Err(e))) => warn!("Server error during shutdown: {}", e),
        Ok(Err(e)) => warn!("Server task failed during shutdown: {}", e),
        Err(_) => {
            warn!(
                "In-flight requests still running after {:?}, abandoning them",
                SHUTDOWN_GRACE
            );
            server.abort();
        }
    }

    pool.close().await;
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
