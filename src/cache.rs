//! Navigation cache: verified URLs for symbolic link targets.
//!
//! Probing a candidate list costs network round trips, so the first URL
//! that resolves for a `(current location, target)` pair is remembered for
//! the rest of the page's lifetime and reused without probing.
//!
//! # Design
//!
//! ## Cache keys
//!
//! Keys are `(location, target)` pairs. The location is part of the key
//! because the same symbolic target resolves to different relative URLs
//! from different folders (`about/mission.html` is `../about/mission.html`
//! from `/program/` but `about/mission.html` from `/`).
//!
//! ## Ordering and lifetime
//!
//! Entries keep insertion order and are unique by key: inserting an
//! existing key replaces its URL in place. Nothing expires; the cache lives
//! exactly as long as the navigator that owns it (one page load).

use std::collections::HashMap;
use std::fmt;

/// One resolved target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub location: String,
    pub target: String,
    pub url: String,
}

/// Insertion-ordered map from `(location, target)` to a verified URL.
#[derive(Debug, Default)]
pub struct NavigationCache {
    entries: Vec<CacheEntry>,
    /// `(location, target)` → position in `entries`.
    index: HashMap<(String, String), usize>,
    stats: CacheStats,
}

fn cache_key(location: &str, target: &str) -> (String, String) {
    (location.to_string(), target.to_string())
}

impl NavigationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a verified URL, counting the hit or miss.
    pub fn get(&mut self, location: &str, target: &str) -> Option<String> {
        match self.peek(location, target) {
            Some(url) => {
                let url = url.to_string();
                self.stats.hit();
                Some(url)
            }
            None => {
                self.stats.miss();
                None
            }
        }
    }

    /// Look up without touching the statistics.
    pub fn peek(&self, location: &str, target: &str) -> Option<&str> {
        let pos = *self.index.get(&cache_key(location, target))?;
        Some(self.entries[pos].url.as_str())
    }

    /// Record a verified URL. Re-inserting a key keeps its position.
    pub fn insert(&mut self, location: &str, target: &str, url: String) {
        let key = cache_key(location, target);
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].url = url,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(CacheEntry {
                    location: location.to_string(),
                    target: target.to_string(),
                    url,
                });
            }
        }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// Lookup counters for one navigator's cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} probed ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} probed", self.misses)
        }
    }
}
