//! Change-detection cache.
//!
//! Remembers the last published string for every observed key so the decode
//! pipeline can tell a repeated sample from a changed one. Text parameters
//! are keyed by tag and HEX registers by their 16-bit identifier, in two
//! independent keyspaces. Registers keep their own entry even when aliasing
//! maps several identifiers onto one catalog definition (the daily history
//! blocks), so each register's history is tracked separately. Entries are
//! created on first observation and never evicted; the key space is bounded
//! by the catalog size.

use std::collections::HashMap;

/// One cached observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Capture time of the first sample seen for this key.
    pub first_seen_ms: u64,
    /// Most recently published value.
    pub last_value: String,
}

impl CacheEntry {
    fn new(value: &str, timestamp_ms: u64) -> Self {
        CacheEntry {
            first_seen_ms: timestamp_ms,
            last_value: value.to_string(),
        }
    }

    /// Absorb a sample, returning `true` when the value differs.
    fn absorb(&mut self, value: &str) -> bool {
        if self.last_value == value {
            false
        } else {
            self.last_value = value.to_string();
            true
        }
    }
}

/// Last-value cache over two disjoint keyspaces: text tags and register ids.
#[derive(Debug, Default)]
pub struct ChangeCache {
    text: HashMap<String, CacheEntry>,
    register: HashMap<u16, CacheEntry>,
}

impl ChangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a text-parameter sample, returning `true` when it is new or
    /// differs from the cached value for its tag.
    pub fn update_text(&mut self, tag: &str, value: &str, timestamp_ms: u64) -> bool {
        match self.text.get_mut(tag) {
            Some(entry) => entry.absorb(value),
            None => {
                self.text
                    .insert(tag.to_string(), CacheEntry::new(value, timestamp_ms));
                true
            }
        }
    }

    /// Record a register sample, returning `true` when it is new or differs
    /// from the cached value for its id.
    pub fn update_register(&mut self, id: u16, value: &str, timestamp_ms: u64) -> bool {
        match self.register.get_mut(&id) {
            Some(entry) => entry.absorb(value),
            None => {
                self.register.insert(id, CacheEntry::new(value, timestamp_ms));
                true
            }
        }
    }

    /// Cached entry for a text tag, if any.
    pub fn text(&self, tag: &str) -> Option<&CacheEntry> {
        self.text.get(tag)
    }

    /// Cached entry for a register id, if any.
    pub fn register(&self, id: u16) -> Option<&CacheEntry> {
        self.register.get(&id)
    }

    /// Number of distinct cached keys across both keyspaces.
    pub fn len(&self) -> usize {
        self.text.len() + self.register.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.register.is_empty()
    }
}
