//! Shared Cache Server Module
//!
//! An RPC server whose registry exposes the cache operations over a
//! process-wide namespace registry, plus the background sweeper that
//! keeps namespaces clean.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::{NamespaceRegistry, NamespaceSettings};
use crate::config::Config;
use crate::error::Result;
use crate::protocol::CallParams;
use crate::rpc::{HandlerFuture, IpcServer};
use crate::sharedcache::handlers;
use crate::tasks::spawn_cleanup_task;

// == Cache Server ==
/// The shared-cache service: an [`IpcServer`] with the cache operation
/// surface registered against one namespace registry.
///
/// All cache state lives in the process that runs this server; clients in
/// any process reach it through [`crate::CacheClient`] over the socket
/// path.
pub struct CacheServer {
    server: IpcServer,
    namespaces: Arc<NamespaceRegistry>,
    cleanup_interval: u64,
    cleanup_task: Option<JoinHandle<()>>,
}

impl CacheServer {
    /// Creates a cache server from configuration; call `startup()` to
    /// begin serving.
    pub fn new(config: &Config) -> Self {
        let defaults = NamespaceSettings {
            max_items: config.max_items,
            global_expiry: config.global_expiry,
            ..NamespaceSettings::default()
        };
        let namespaces = Arc::new(NamespaceRegistry::new(defaults));
        let server = IpcServer::new(&config.socket_path);
        register_operations(&server, namespaces.clone(), config.item_expiry);

        Self {
            server,
            namespaces,
            cleanup_interval: config.cleanup_interval,
            cleanup_task: None,
        }
    }

    /// The socket path this server serves on.
    pub fn socket_path(&self) -> &Path {
        self.server.socket_path()
    }

    /// Shared handle to the namespace registry.
    pub fn namespaces(&self) -> Arc<NamespaceRegistry> {
        self.namespaces.clone()
    }

    /// True while the server is accepting connections.
    pub fn is_running(&self) -> bool {
        self.server.is_running()
    }

    /// Flips to `true` when the server begins shutting down, including a
    /// client-requested harakiri.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.server.shutdown_signal()
    }

    /// Starts serving and spawns the cleanup sweeper. Idempotent.
    pub async fn startup(&mut self) -> Result<()> {
        self.server.startup().await?;
        let sweeper_running = self
            .cleanup_task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false);
        if !sweeper_running {
            self.cleanup_task = Some(spawn_cleanup_task(
                self.namespaces.clone(),
                self.cleanup_interval,
            ));
        }
        info!("Cache server ready on {}", self.socket_path().display());
        Ok(())
    }

    /// Stops serving, aborts the sweeper, and removes the socket file.
    /// Safe to call twice.
    pub async fn shutdown(&mut self) {
        self.server.shutdown().await;
        if let Some(task) = self.cleanup_task.take() {
            task.abort();
        }
    }
}

// == Operation Registration ==
/// Makes the cache operations available for remote calls.
fn register_operations(
    server: &IpcServer,
    namespaces: Arc<NamespaceRegistry>,
    default_item_expiry: u64,
) {
    let ns = namespaces.clone();
    server.register("create_namespace", move |params: CallParams| -> HandlerFuture {
        let ns = ns.clone();
        Box::pin(async move { handlers::create_namespace(&ns, params).await })
    });

    let ns = namespaces.clone();
    server.register("configure_namespace", move |params: CallParams| -> HandlerFuture {
        let ns = ns.clone();
        Box::pin(async move { handlers::configure_namespace(&ns, params).await })
    });

    let ns = namespaces.clone();
    server.register("put", move |params: CallParams| -> HandlerFuture {
        let ns = ns.clone();
        Box::pin(async move { handlers::put(&ns, default_item_expiry, params).await })
    });

    let ns = namespaces.clone();
    server.register("get", move |params: CallParams| -> HandlerFuture {
        let ns = ns.clone();
        Box::pin(async move { handlers::get(&ns, params).await })
    });

    let ns = namespaces.clone();
    server.register("invalidate", move |params: CallParams| -> HandlerFuture {
        let ns = ns.clone();
        Box::pin(async move { handlers::invalidate(&ns, params).await })
    });

    let ns = namespaces.clone();
    server.register("get_stats", move |params: CallParams| -> HandlerFuture {
        let ns = ns.clone();
        Box::pin(async move { handlers::get_stats(&ns, params).await })
    });

    let ns = namespaces;
    server.register("reset_stats", move |params: CallParams| -> HandlerFuture {
        let ns = ns.clone();
        Box::pin(async move { handlers::reset_stats(&ns, params).await })
    });
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(tag: &str) -> Config {
        Config {
            socket_path: std::env::temp_dir().join(format!(
                "crosscache-cachesrv-test-{}-{}.sock",
                std::process::id(),
                tag
            )),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_startup_and_shutdown() {
        let config = test_config("lifecycle");
        let mut server = CacheServer::new(&config);

        server.startup().await.unwrap();
        assert!(server.is_running());
        assert!(config.socket_path.exists());

        server.shutdown().await;
        assert!(!server.is_running());
        assert!(!config.socket_path.exists());
    }

    #[tokio::test]
    async fn test_startup_is_idempotent() {
        let config = test_config("idempotent");
        let mut server = CacheServer::new(&config);

        server.startup().await.unwrap();
        server.startup().await.unwrap();
        assert!(server.is_running());

        server.shutdown().await;
        server.shutdown().await;
    }
}
