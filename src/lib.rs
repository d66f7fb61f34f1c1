//! Crosscache - a cross-process shared cache over Unix-socket RPC
//!
//! One server process owns all cache state; clients in any process on the
//! host reach it through a length-prefixed MessagePack protocol over a
//! Unix-domain socket. Namespaces bound capacity and lifetime with FIFO
//! eviction, dual expiry, and hit/get/put statistics.

pub mod cache;
pub mod config;
pub mod error;
pub mod protocol;
pub mod rpc;
pub mod sharedcache;
pub mod tasks;

pub use cache::{Namespace, NamespaceSettings, NamespaceStats, NamespaceUpdate};
pub use config::Config;
pub use error::{Error, Result};
pub use rpc::{IpcClient, IpcServer};
pub use sharedcache::{CacheClient, CacheServer, SharedCache};
pub use tasks::spawn_cleanup_task;
