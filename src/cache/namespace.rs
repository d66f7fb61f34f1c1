//! Namespace Module
//!
//! A capacity- and time-bounded key-value store with FIFO eviction and
//! hit/get/put statistics. One namespace is one isolated cache region;
//! the server guards each behind its own lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::cache::{CacheEntry, InsertionOrder, NamespaceStats};
use crate::error::{Error, Result};

// == Namespace Settings ==
/// Tunables for one namespace.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceSettings {
    /// Maximum number of items held; 0 means no capacity bound
    pub max_items: usize,
    /// Cap in seconds on every item's lifetime, regardless of its own expiry
    pub global_expiry: u64,
    /// Whether the background sweeper may clean this namespace
    pub autoclean: bool,
    /// Disables both capacity eviction and expiry entirely
    pub unlimited: bool,
}

impl Default for NamespaceSettings {
    fn default() -> Self {
        Self {
            max_items: 100,
            global_expiry: 300,
            autoclean: true,
            unlimited: false,
        }
    }
}

// == Namespace Update ==
/// A partial reconfiguration; only the present fields are applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceUpdate {
    pub max_items: Option<usize>,
    pub global_expiry: Option<u64>,
    pub autoclean: Option<bool>,
    pub unlimited: Option<bool>,
}

impl NamespaceUpdate {
    /// Settings produced by overlaying this update on the defaults.
    pub fn into_settings(self) -> NamespaceSettings {
        let mut settings = NamespaceSettings::default();
        self.apply_to(&mut settings);
        settings
    }

    fn apply_to(&self, settings: &mut NamespaceSettings) {
        if let Some(max_items) = self.max_items {
            settings.max_items = max_items;
        }
        if let Some(global_expiry) = self.global_expiry {
            settings.global_expiry = global_expiry;
        }
        if let Some(autoclean) = self.autoclean {
            settings.autoclean = autoclean;
        }
        if let Some(unlimited) = self.unlimited {
            settings.unlimited = unlimited;
        }
    }
}

// == Namespace ==
/// One isolated cache region.
///
/// Retrievability invariant: for a non-unlimited namespace an entry is
/// readable only while `elapsed < min(global_expiry, item expiry)`;
/// expired entries read as absent and are purged on the read that finds
/// them or by a sweep. Capacity is enforced by evicting the
/// oldest-inserted entry, never the least recently used one.
#[derive(Debug)]
pub struct Namespace {
    name: String,
    settings: NamespaceSettings,
    entries: HashMap<String, CacheEntry>,
    order: InsertionOrder,
    stats: NamespaceStats,
    last_clean: Instant,
}

impl Namespace {
    // == Constructor ==
    /// Creates an empty namespace with the given settings.
    pub fn new(name: impl Into<String>, settings: NamespaceSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: NamespaceStats::new(),
            last_clean: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> NamespaceSettings {
        self.settings
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Counts the get, then the hit only if the entry exists and is
    /// live; an expired entry is removed as a side effect and reported
    /// as absent.
    pub fn get(&mut self, key: &str) -> Result<Value> {
        self.stats.record_get();

        let expired = match self.entries.get(key) {
            None => return Err(Error::NotFound(key.to_string())),
            Some(entry) => {
                !self.settings.unlimited
                    && entry.is_expired(Duration::from_secs(self.settings.global_expiry))
            }
        };

        if expired {
            self.entries.remove(key);
            self.order.remove(key);
            return Err(Error::NotFound(key.to_string()));
        }

        self.stats.record_hit();
        Ok(self.entries[key].value.clone())
    }

    // == Put ==
    /// Stores a value under `key` with the given item expiry in seconds.
    ///
    /// At capacity the oldest-inserted entry is evicted first. Storing
    /// under an existing key counts as a fresh insertion at the end of
    /// the eviction order.
    pub fn put(&mut self, key: &str, value: Value, expiry_secs: u64) {
        let settings = self.settings;
        if !settings.unlimited && settings.max_items > 0 && self.entries.len() >= settings.max_items
        {
            if let Some(oldest) = self.order.pop_oldest() {
                self.entries.remove(&oldest);
            }
        }

        self.order.record(key);
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, expiry_secs));
        self.stats.record_put();
    }

    // == Invalidate ==
    /// Removes every entry. Statistics counters are untouched.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    // == Configure ==
    /// Applies a partial reconfiguration in place.
    pub fn configure(&mut self, update: NamespaceUpdate) {
        update.apply_to(&mut self.settings);
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> NamespaceStats {
        self.stats
    }

    /// Zeroes the counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Sweep Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        if self.settings.unlimited {
            return 0;
        }
        let global_expiry = Duration::from_secs(self.settings.global_expiry);

        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(global_expiry))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.order.remove(key);
        }

        expired_keys.len()
    }

    // == Clean Scheduling ==
    /// Whether the sweeper is due to clean this namespace.
    pub fn due_for_clean(&self) -> bool {
        self.settings.autoclean
            && !self.settings.unlimited
            && self.last_clean.elapsed() >= Duration::from_secs(self.settings.global_expiry)
    }

    /// Records that a sweep ran now.
    pub fn mark_cleaned(&mut self) {
        self.last_clean = Instant::now();
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn backdate(&mut self, key: &str, by: Duration) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.inserted_at -= by;
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn namespace(settings: NamespaceSettings) -> Namespace {
        Namespace::new("test", settings)
    }

    #[test]
    fn test_put_and_get() {
        let mut ns = namespace(NamespaceSettings::default());

        ns.put("key1", json!("value1"), 60);
        let value = ns.get("key1").unwrap();

        assert_eq!(value, json!("value1"));
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn test_get_nonexistent() {
        let mut ns = namespace(NamespaceSettings::default());

        let result = ns.get("nonexistent");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_overwrite_key() {
        let mut ns = namespace(NamespaceSettings::default());

        ns.put("key1", json!("value1"), 60);
        ns.put("key1", json!("value2"), 60);

        assert_eq!(ns.get("key1").unwrap(), json!("value2"));
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest_inserted() {
        let mut ns = namespace(NamespaceSettings {
            max_items: 2,
            ..Default::default()
        });

        ns.put("a", json!(1), 60);
        ns.put("b", json!(2), 60);
        ns.put("c", json!(3), 60);

        assert!(matches!(ns.get("a"), Err(Error::NotFound(_))));
        assert_eq!(ns.get("b").unwrap(), json!(2));
        assert_eq!(ns.get("c").unwrap(), json!(3));
        assert_eq!(ns.len(), 2);
    }

    #[test]
    fn test_eviction_ignores_access_recency() {
        let mut ns = namespace(NamespaceSettings {
            max_items: 2,
            ..Default::default()
        });

        ns.put("a", json!(1), 60);
        ns.put("b", json!(2), 60);
        // Reading "a" must not protect it: eviction is FIFO, not LRU.
        ns.get("a").unwrap();
        ns.put("c", json!(3), 60);

        assert!(ns.get("a").is_err());
        assert!(ns.get("b").is_ok());
        assert!(ns.get("c").is_ok());
    }

    #[test]
    fn test_reinsert_counts_as_fresh_insertion() {
        let mut ns = namespace(NamespaceSettings {
            max_items: 3,
            ..Default::default()
        });

        ns.put("a", json!(1), 60);
        ns.put("b", json!(2), 60);
        ns.put("c", json!(3), 60);
        // "a" becomes the newest insertion, so "b" is now the oldest.
        ns.put("a", json!(10), 60);
        ns.put("d", json!(4), 60);

        assert!(ns.get("b").is_err());
        assert_eq!(ns.get("a").unwrap(), json!(10));
        assert!(ns.get("c").is_ok());
        assert!(ns.get("d").is_ok());
    }

    #[test]
    fn test_expired_entry_reads_as_absent_and_is_purged() {
        let mut ns = namespace(NamespaceSettings::default());

        ns.put("k", json!("v"), 5);
        ns.backdate("k", Duration::from_secs(10));

        assert!(matches!(ns.get("k"), Err(Error::NotFound(_))));
        // Purged by the failed read.
        assert_eq!(ns.len(), 0);
    }

    #[test]
    fn test_global_expiry_caps_item_expiry() {
        let mut ns = namespace(NamespaceSettings {
            global_expiry: 5,
            ..Default::default()
        });

        ns.put("k", json!("v"), 3600);
        ns.backdate("k", Duration::from_secs(10));

        assert!(ns.get("k").is_err());
    }

    #[test]
    fn test_unlimited_disables_expiry_and_capacity() {
        let mut ns = namespace(NamespaceSettings {
            max_items: 1,
            global_expiry: 1,
            unlimited: true,
            ..Default::default()
        });

        ns.put("a", json!(1), 1);
        ns.put("b", json!(2), 1);
        ns.backdate("a", Duration::from_secs(10));

        assert_eq!(ns.get("a").unwrap(), json!(1));
        assert_eq!(ns.get("b").unwrap(), json!(2));
        assert_eq!(ns.len(), 2);
    }

    #[test]
    fn test_invalidate_clears_entries_keeps_stats() {
        let mut ns = namespace(NamespaceSettings::default());

        ns.put("a", json!(1), 60);
        ns.get("a").unwrap();
        ns.invalidate();

        assert!(ns.is_empty());
        let stats = ns.stats();
        assert_eq!(stats.puts, 1);
        assert_eq!(stats.gets, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_stats_accounting() {
        let mut ns = namespace(NamespaceSettings::default());

        ns.put("a", json!(1), 60);
        ns.put("b", json!(2), 60);
        ns.get("a").unwrap();
        ns.get("missing").unwrap_err();
        ns.get("b").unwrap();

        let stats = ns.stats();
        assert_eq!(stats.puts, 2);
        assert_eq!(stats.gets, 3);
        assert_eq!(stats.hits, 2);

        ns.reset_stats();
        assert_eq!(ns.stats(), NamespaceStats::new());
    }

    #[test]
    fn test_expired_miss_still_counts_as_get() {
        let mut ns = namespace(NamespaceSettings::default());

        ns.put("k", json!("v"), 5);
        ns.backdate("k", Duration::from_secs(10));
        ns.get("k").unwrap_err();

        let stats = ns.stats();
        assert_eq!(stats.gets, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_sweep_expired() {
        let mut ns = namespace(NamespaceSettings::default());

        ns.put("old", json!(1), 5);
        ns.put("fresh", json!(2), 3600);
        ns.backdate("old", Duration::from_secs(10));

        let removed = ns.sweep_expired();
        assert_eq!(removed, 1);
        assert_eq!(ns.len(), 1);
        assert!(ns.get("fresh").is_ok());
    }

    #[test]
    fn test_sweep_skips_unlimited() {
        let mut ns = namespace(NamespaceSettings {
            unlimited: true,
            ..Default::default()
        });

        ns.put("k", json!(1), 1);
        ns.backdate("k", Duration::from_secs(10));

        assert_eq!(ns.sweep_expired(), 0);
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn test_due_for_clean() {
        let mut ns = namespace(NamespaceSettings {
            global_expiry: 30,
            ..Default::default()
        });
        assert!(!ns.due_for_clean());

        ns.last_clean = Instant::now() - Duration::from_secs(60);
        assert!(ns.due_for_clean());

        ns.mark_cleaned();
        assert!(!ns.due_for_clean());
    }

    #[test]
    fn test_due_for_clean_respects_flags() {
        let mut ns = namespace(NamespaceSettings {
            global_expiry: 1,
            autoclean: false,
            ..Default::default()
        });
        ns.last_clean = Instant::now() - Duration::from_secs(10);
        assert!(!ns.due_for_clean());

        ns.configure(NamespaceUpdate {
            autoclean: Some(true),
            ..Default::default()
        });
        assert!(ns.due_for_clean());
    }

    #[test]
    fn test_configure_applies_only_present_fields() {
        let mut ns = namespace(NamespaceSettings::default());

        ns.configure(NamespaceUpdate {
            max_items: Some(5),
            ..Default::default()
        });

        let settings = ns.settings();
        assert_eq!(settings.max_items, 5);
        assert_eq!(settings.global_expiry, 300);
        assert!(settings.autoclean);
        assert!(!settings.unlimited);
    }
}
