//! Cache Module
//!
//! Provides in-memory caching with dual expiry (per-item and
//! namespace-wide), FIFO eviction, and per-namespace statistics.

mod entry;
mod namespace;
mod order;
mod registry;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use namespace::{Namespace, NamespaceSettings, NamespaceUpdate};
pub use order::InsertionOrder;
pub use registry::{NamespaceRegistry, SharedNamespace};
pub use stats::NamespaceStats;
