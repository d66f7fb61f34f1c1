//! Shared Cache Client Module
//!
//! Typed client wrappers over the RPC engine: [`CacheClient`] declares
//! one method per server operation, and [`SharedCache`] binds a client to
//! a single namespace with a map-like get/set surface.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::{json, Value};

use crate::cache::{NamespaceSettings, NamespaceStats, NamespaceUpdate};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::Lookup;
use crate::rpc::IpcClient;

// == Cache Client ==
/// Typed wrapper exposing every cache server operation.
pub struct CacheClient {
    rpc: IpcClient,
}

impl CacheClient {
    /// Connects to the cache server listening at `path`.
    pub async fn connect(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            rpc: IpcClient::connect(path).await?,
        })
    }

    /// Connects using the socket path and retry budget from `config`.
    pub async fn connect_with_config(config: &Config) -> Result<Self> {
        Ok(Self {
            rpc: IpcClient::connect_with(
                &config.socket_path,
                config.connect_retries,
                Duration::from_millis(config.connect_backoff_ms),
            )
            .await?,
        })
    }

    /// True until `disconnect()` or `shutdown()` has been called.
    pub fn is_connected(&self) -> bool {
        self.rpc.is_connected()
    }

    /// Creates a namespace with explicit settings; fails if it exists.
    pub async fn create_namespace(
        &mut self,
        name: &str,
        settings: NamespaceSettings,
    ) -> Result<()> {
        self.rpc
            .invoke(
                "create_namespace",
                vec![
                    json!(name),
                    json!(settings.max_items),
                    json!(settings.global_expiry),
                    json!(settings.autoclean),
                    json!(settings.unlimited),
                ],
                HashMap::new(),
            )
            .await?;
        Ok(())
    }

    /// Creates the namespace with defaults if absent, else applies only
    /// the fields present in `update`.
    pub async fn configure_namespace(
        &mut self,
        name: &str,
        update: NamespaceUpdate,
    ) -> Result<()> {
        let mut kwargs = HashMap::new();
        if let Some(max_items) = update.max_items {
            kwargs.insert("max_items".to_string(), json!(max_items));
        }
        if let Some(global_expiry) = update.global_expiry {
            kwargs.insert("global_expiry".to_string(), json!(global_expiry));
        }
        if let Some(autoclean) = update.autoclean {
            kwargs.insert("autoclean".to_string(), json!(autoclean));
        }
        if let Some(unlimited) = update.unlimited {
            kwargs.insert("unlimited".to_string(), json!(unlimited));
        }

        self.rpc
            .invoke("configure_namespace", vec![json!(name)], kwargs)
            .await?;
        Ok(())
    }

    /// Stores a value; `expiry` falls back to the server default when
    /// `None`.
    pub async fn put(
        &mut self,
        namespace: &str,
        key: &str,
        value: Value,
        expiry: Option<u64>,
    ) -> Result<()> {
        let mut kwargs = HashMap::new();
        if let Some(expiry) = expiry {
            kwargs.insert("expiry".to_string(), json!(expiry));
        }

        self.rpc
            .invoke("put", vec![json!(namespace), json!(key), value], kwargs)
            .await?;
        Ok(())
    }

    /// Retrieves a value; `None` when the key (or namespace) is absent.
    pub async fn get(&mut self, namespace: &str, key: &str) -> Result<Option<Value>> {
        let value = self
            .rpc
            .invoke("get", vec![json!(namespace), json!(key)], HashMap::new())
            .await?;
        let lookup: Lookup = serde_json::from_value(value)?;
        Ok(lookup.into_option())
    }

    /// Clears all entries of a namespace.
    pub async fn invalidate(&mut self, namespace: &str) -> Result<()> {
        self.rpc
            .invoke("invalidate", vec![json!(namespace)], HashMap::new())
            .await?;
        Ok(())
    }

    /// Reads the hit/get/put counters; `None` when the namespace does not
    /// exist.
    pub async fn get_stats(&mut self, namespace: &str) -> Result<Option<NamespaceStats>> {
        let value = self
            .rpc
            .invoke("get_stats", vec![json!(namespace)], HashMap::new())
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Zeroes the counters; returns whether the namespace existed.
    pub async fn reset_stats(&mut self, namespace: &str) -> Result<bool> {
        let value = self
            .rpc
            .invoke("reset_stats", vec![json!(namespace)], HashMap::new())
            .await?;
        value.as_bool().ok_or_else(|| {
            Error::Protocol(format!("Unexpected reset_stats response: {}", value))
        })
    }

    /// Goodbye handshake and socket close; safe to call twice.
    pub async fn disconnect(&mut self) {
        self.rpc.disconnect().await;
    }

    /// Requests the server to terminate itself (harakiri).
    pub async fn shutdown(&mut self) -> Result<()> {
        self.rpc.shutdown().await
    }
}

// == Shared Cache ==
/// Map-like view of one namespace on a cache server.
///
/// Connecting configures the namespace (creating it when needed), so
/// any process can construct a `SharedCache` for the same name and see
/// the same data.
pub struct SharedCache {
    client: CacheClient,
    namespace: String,
    default_expiry: Option<u64>,
}

impl SharedCache {
    /// Connects to the server at `path` and binds `namespace`, applying
    /// `update` to its configuration.
    pub async fn connect(
        path: impl Into<PathBuf>,
        namespace: &str,
        update: NamespaceUpdate,
    ) -> Result<Self> {
        let mut client = CacheClient::connect(path).await?;
        client.configure_namespace(namespace, update).await?;
        Ok(Self {
            client,
            namespace: namespace.to_string(),
            default_expiry: None,
        })
    }

    /// Overrides the item expiry used by `set` (the server default
    /// applies otherwise).
    pub fn with_default_expiry(mut self, expiry_secs: u64) -> Self {
        self.default_expiry = Some(expiry_secs);
        self
    }

    /// The namespace this cache is bound to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The underlying typed client, for operations outside the map-like
    /// surface.
    pub fn client(&mut self) -> &mut CacheClient {
        &mut self.client
    }

    /// Retrieves a value, failing with `Error::NotFound` when absent.
    pub async fn get(&mut self, key: &str) -> Result<Value> {
        self.try_get(key)
            .await?
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Retrieves a value, `None` when absent.
    pub async fn try_get(&mut self, key: &str) -> Result<Option<Value>> {
        self.client.get(&self.namespace, key).await
    }

    /// Stores a value with the default item expiry.
    pub async fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.client
            .put(&self.namespace, key, value, self.default_expiry)
            .await
    }

    /// Stores a value with an explicit item expiry.
    pub async fn set_with_expiry(&mut self, key: &str, value: Value, expiry_secs: u64) -> Result<()> {
        self.client
            .put(&self.namespace, key, value, Some(expiry_secs))
            .await
    }

    /// Clears the namespace.
    pub async fn invalidate(&mut self) -> Result<()> {
        self.client.invalidate(&self.namespace).await
    }

    /// Reads the namespace counters.
    pub async fn stats(&mut self) -> Result<Option<NamespaceStats>> {
        self.client.get_stats(&self.namespace).await
    }

    /// Zeroes the namespace counters.
    pub async fn reset_stats(&mut self) -> Result<bool> {
        self.client.reset_stats(&self.namespace).await
    }

    /// Disconnects from the server.
    pub async fn disconnect(&mut self) {
        self.client.disconnect().await;
    }
}
