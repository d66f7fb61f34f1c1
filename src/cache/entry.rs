//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with per-item expiry.

use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// A single cached value with its insertion time and item expiry.
///
/// The effective lifetime is `min(item expiry, namespace global expiry)`;
/// the namespace cap is applied at check time because it can be
/// reconfigured after the entry is stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Monotonic insertion timestamp
    pub inserted_at: Instant,
    /// Per-item expiry
    pub expiry: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with the given item expiry in seconds.
    pub fn new(value: Value, expiry_secs: u64) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            expiry: Duration::from_secs(expiry_secs),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `min(item, global)` expiry.
    ///
    /// Boundary condition: an entry whose effective lifetime has fully
    /// elapsed (`elapsed >= min`) is expired, matching the retrievability
    /// window `elapsed < min(item, global)`.
    pub fn is_expired(&self, global_expiry: Duration) -> bool {
        self.inserted_at.elapsed() >= self.expiry.min(global_expiry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn test_entry_fresh_is_not_expired() {
        let entry = CacheEntry::new(json!("test_value"), 60);
        assert!(!entry.is_expired(Duration::from_secs(300)));
    }

    #[test]
    fn test_entry_item_expiry_elapses() {
        let mut entry = CacheEntry::new(json!("v"), 1);
        // Backdate instead of sleeping a full second.
        entry.inserted_at = Instant::now() - Duration::from_millis(1100);
        assert!(entry.is_expired(Duration::from_secs(300)));
    }

    #[test]
    fn test_global_expiry_caps_item_expiry() {
        let mut entry = CacheEntry::new(json!("v"), 3600);
        entry.inserted_at = Instant::now() - Duration::from_secs(10);
        // Item expiry alone would keep it alive, the namespace cap does not.
        assert!(!entry.is_expired(Duration::from_secs(3600)));
        assert!(entry.is_expired(Duration::from_secs(5)));
    }

    #[test]
    fn test_item_expiry_below_global() {
        let mut entry = CacheEntry::new(json!("v"), 5);
        entry.inserted_at = Instant::now() - Duration::from_secs(10);
        assert!(entry.is_expired(Duration::from_secs(3600)));
    }

    #[test]
    fn test_expiration_boundary() {
        let entry = CacheEntry::new(json!("v"), 0);
        sleep(Duration::from_millis(5));
        // Zero lifetime expires immediately.
        assert!(entry.is_expired(Duration::from_secs(300)));
    }
}
