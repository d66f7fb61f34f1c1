//! Namespace Statistics Module
//!
//! Tracks per-namespace cache metrics: hits, gets, and puts.

use serde::{Deserialize, Serialize};

// == Namespace Stats ==
/// Tracks cache access metrics for one namespace.
///
/// All three counters grow monotonically and are zeroed only by an
/// explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceStats {
    /// Number of successful retrievals
    pub hits: u64,
    /// Number of retrieval attempts, hits and misses alike
    pub gets: u64,
    /// Number of insertions
    pub puts: u64,
}

impl NamespaceStats {
    // == Constructor ==
    /// Creates stats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the hit rate: hits / gets, or 0.0 with no gets yet.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Get ==
    /// Increments the get counter.
    pub fn record_get(&mut self) {
        self.gets += 1;
    }

    // == Record Put ==
    /// Increments the put counter.
    pub fn record_put(&mut self) {
        self.puts += 1;
    }

    // == Reset ==
    /// Zeroes all three counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = NamespaceStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.gets, 0);
        assert_eq!(stats.puts, 0);
    }

    #[test]
    fn test_hit_rate_no_gets() {
        let stats = NamespaceStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = NamespaceStats::new();
        stats.record_get();
        stats.record_hit();
        stats.record_get();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_reset() {
        let mut stats = NamespaceStats::new();
        stats.record_get();
        stats.record_hit();
        stats.record_put();
        stats.reset();
        assert_eq!(stats, NamespaceStats::new());
    }

    #[test]
    fn test_serialize_shape() {
        let mut stats = NamespaceStats::new();
        stats.record_put();
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value, serde_json::json!({"hits": 0, "gets": 0, "puts": 1}));
    }
}
