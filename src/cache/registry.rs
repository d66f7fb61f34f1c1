//! Namespace Registry Module
//!
//! Process-wide mapping from namespace name to namespace, created lazily
//! on first use and reconfigured in place. The registry has its own lock;
//! each namespace sits behind its own exclusive lock so operations on
//! different namespaces never serialize against each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::cache::{Namespace, NamespaceSettings, NamespaceUpdate};
use crate::error::{Error, Result};

/// A namespace behind its per-namespace lock.
pub type SharedNamespace = Arc<Mutex<Namespace>>;

// == Namespace Registry ==
/// Registry of all namespaces owned by one server process.
pub struct NamespaceRegistry {
    namespaces: RwLock<HashMap<String, SharedNamespace>>,
    defaults: NamespaceSettings,
}

impl NamespaceRegistry {
    /// Creates an empty registry; `defaults` configure namespaces created
    /// lazily by `put` or `configure` with missing fields.
    pub fn new(defaults: NamespaceSettings) -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            defaults,
        }
    }

    /// The settings applied to lazily created namespaces.
    pub fn defaults(&self) -> NamespaceSettings {
        self.defaults
    }

    // == Create ==
    /// Creates a namespace with explicit settings.
    ///
    /// # Errors
    /// `Error::Registry` if the name is already taken.
    pub async fn create(&self, name: &str, settings: NamespaceSettings) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        if namespaces.contains_key(name) {
            return Err(Error::Registry(format!(
                "Namespace '{}' already exists",
                name
            )));
        }
        debug!("Creating namespace '{}'", name);
        namespaces.insert(
            name.to_string(),
            Arc::new(Mutex::new(Namespace::new(name, settings))),
        );
        Ok(())
    }

    // == Configure ==
    /// Reconfigures a namespace in place, creating it first (defaults
    /// overlaid with the provided fields) if it does not exist.
    pub async fn configure(&self, name: &str, update: NamespaceUpdate) {
        let mut namespaces = self.namespaces.write().await;
        match namespaces.get(name) {
            Some(namespace) => namespace.lock().await.configure(update),
            None => {
                let mut settings = self.defaults;
                if let Some(max_items) = update.max_items {
                    settings.max_items = max_items;
                }
                if let Some(global_expiry) = update.global_expiry {
                    settings.global_expiry = global_expiry;
                }
                if let Some(autoclean) = update.autoclean {
                    settings.autoclean = autoclean;
                }
                if let Some(unlimited) = update.unlimited {
                    settings.unlimited = unlimited;
                }
                debug!("Creating namespace '{}' via configure", name);
                namespaces.insert(
                    name.to_string(),
                    Arc::new(Mutex::new(Namespace::new(name, settings))),
                );
            }
        }
    }

    // == Lookup ==
    /// Finds an existing namespace.
    pub async fn lookup(&self, name: &str) -> Option<SharedNamespace> {
        self.namespaces.read().await.get(name).cloned()
    }

    // == Get Or Create ==
    /// Finds a namespace, creating a default-configured one if absent
    /// (the `put` path).
    pub async fn get_or_create(&self, name: &str) -> SharedNamespace {
        if let Some(namespace) = self.lookup(name).await {
            return namespace;
        }
        let mut namespaces = self.namespaces.write().await;
        namespaces
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Creating namespace '{}' on first put", name);
                Arc::new(Mutex::new(Namespace::new(name, self.defaults)))
            })
            .clone()
    }

    // == All ==
    /// Snapshot of every namespace, for the sweeper.
    pub async fn all(&self) -> Vec<SharedNamespace> {
        self.namespaces.read().await.values().cloned().collect()
    }

    // == Length ==
    pub async fn len(&self) -> usize {
        self.namespaces.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.namespaces.read().await.is_empty()
    }
}
