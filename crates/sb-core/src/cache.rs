//! Per-side verdict cache keyed by request URL.

use dashmap::DashMap;

/// Write-once verdict cache. Entries live until the next `clear()`.
///
/// Sharded, so concurrent queries under the engine's read lock do not
/// serialize on a single mutex.
#[derive(Debug, Default)]
pub struct MatchCache {
    entries: DashMap<String, bool>,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached verdict for a URL.
    pub fn get(&self, url: &str) -> Option<bool> {
        self.entries.get(url).map(|entry| *entry)
    }

    /// Record a verdict. An existing entry is kept.
    pub fn insert(&self, url: &str, matched: bool) {
        self.entries.entry(url.to_string()).or_insert(matched);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
