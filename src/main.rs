//! Crosscache - a cross-process shared cache server
//!
//! Runs a shared-cache server in the foreground on a Unix-domain socket.
//! A parent process may spawn this binary and let clients in any process
//! connect to the configured socket path.

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crosscache::{CacheServer, Config};

/// Main entry point for the crosscache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the cache server (socket bind, accept loop, cleanup task)
/// 4. Run until SIGINT/SIGTERM or a client-requested shutdown (harakiri)
/// 5. Shut down cleanly, removing the socket file
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crosscache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting crosscache server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: socket={}, max_items={}, global_expiry={}s, cleanup_interval={}s",
        config.socket_path.display(),
        config.max_items,
        config.global_expiry,
        config.cleanup_interval
    );

    let mut server = CacheServer::new(&config);
    server.startup().await?;

    wait_for_termination(&server).await;

    server.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C, SIGTERM, or a client-triggered harakiri.
async fn wait_for_termination(server: &CacheServer) {
    let mut harakiri = server.shutdown_signal();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
        _ = harakiri.changed() => {
            info!("Shutdown requested over the socket, initiating shutdown...");
        }
    }
}
