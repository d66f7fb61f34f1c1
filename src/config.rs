//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Server and client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unix socket path the server binds and clients connect to
    pub socket_path: PathBuf,
    /// Default maximum number of items a namespace can hold
    pub max_items: usize,
    /// Default namespace-wide expiry cap in seconds
    pub global_expiry: u64,
    /// Default per-item expiry in seconds for puts that do not specify one
    pub item_expiry: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Number of connect attempts before giving up on a refused socket
    pub connect_retries: u32,
    /// Delay between connect attempts in milliseconds
    pub connect_backoff_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CROSSCACHE_SOCKET` - Unix socket path (default: /tmp/crosscache.sock)
    /// - `CROSSCACHE_MAX_ITEMS` - Default namespace capacity (default: 100)
    /// - `CROSSCACHE_GLOBAL_EXPIRY` - Default namespace expiry cap in seconds (default: 300)
    /// - `CROSSCACHE_ITEM_EXPIRY` - Default per-item expiry in seconds (default: 86400)
    /// - `CROSSCACHE_CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 5)
    /// - `CROSSCACHE_CONNECT_RETRIES` - Connect attempts on refused sockets (default: 200)
    /// - `CROSSCACHE_CONNECT_BACKOFF_MS` - Delay between attempts (default: 5)
    pub fn from_env() -> Self {
        Self {
            socket_path: env::var("CROSSCACHE_SOCKET")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/crosscache.sock")),
            max_items: env::var("CROSSCACHE_MAX_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            global_expiry: env::var("CROSSCACHE_GLOBAL_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            item_expiry: env::var("CROSSCACHE_ITEM_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86400),
            cleanup_interval: env::var("CROSSCACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            connect_retries: env::var("CROSSCACHE_CONNECT_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),
            connect_backoff_ms: env::var("CROSSCACHE_CONNECT_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/tmp/crosscache.sock"),
            max_items: 100,
            global_expiry: 300,
            item_expiry: 86400,
            cleanup_interval: 5,
            connect_retries: 200,
            connect_backoff_ms: 5,
        }
    }
}
