//! In-process counters for telemetry reporting.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe set of named counters, fixed at construction.
///
/// Increments on unregistered names are dropped silently so callers never
/// have to handle a miss on the hot path.
pub struct StatsCounter {
    counters: BTreeMap<&'static str, AtomicU64>,
}

impl StatsCounter {
    pub fn new(names: &[&'static str]) -> Self {
        let counters = names.iter().map(|&n| (n, AtomicU64::new(0))).collect();
        Self { counters }
    }

    pub fn incr(&self, name: &str) {
        self.add(name, 1);
    }

    pub fn add(&self, name: &str, value: u64) {
        if let Some(counter) = self.counters.get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Snapshot of every counter, sorted by name for stable output.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        self.counters
            .iter()
            .map(|(&k, v)| (k, v.load(Ordering::Relaxed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_names_are_ignored() {
        let stats = StatsCounter::new(&["a"]);
        stats.incr("a");
        stats.incr("missing");
        assert_eq!(stats.get("a"), 1);
        assert_eq!(stats.get("missing"), 0);
    }

    #[test]
    fn snapshot_is_sorted_and_complete() {
        let stats = StatsCounter::new(&["b", "a"]);
        stats.add("b", 3);
        let snap = stats.snapshot();
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec![&"a", &"b"]);
        assert_eq!(snap[&"b"], 3);
    }
}
