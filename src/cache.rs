//! In-process TTL cache for fetched API payloads.

use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const MAX_CACHE_ENTRIES: usize = 10_000;

/// Expiring key/value cache. Entries past their TTL read as misses and are
/// evicted lazily; inserts past the size cap evict the soonest-to-expire
/// entries first.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: HashMap<String, (Instant, Value)>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some((expiry, _)) if Instant::now() > *expiry => {
                self.entries.remove(key);
                None
            }
            Some((_, value)) => Some(value.clone()),
            None => None,
        }
    }

    pub fn set(&mut self, key: &str, value: Value, ttl: Duration) {
        if self.entries.len() >= MAX_CACHE_ENTRIES {
            self.cleanup();
        }
        self.entries
            .insert(key.to_string(), (Instant::now() + ttl, value));
    }

    /// Remaining lifetime of a cached entry, if present and unexpired.
    pub fn expiry(&self, key: &str) -> Option<Duration> {
        let (expiry, _) = self.entries.get(key)?;
        expiry.checked_duration_since(Instant::now())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cleanup(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, (expiry, _)| now <= *expiry);

        if self.entries.len() >= MAX_CACHE_ENTRIES {
            let mut by_expiry: Vec<(String, Instant)> = self
                .entries
                .iter()
                .map(|(k, (expiry, _))| (k.clone(), *expiry))
                .collect();
            by_expiry.sort_by_key(|(_, expiry)| *expiry);

            let to_remove = self.entries.len() - MAX_CACHE_ENTRIES + 1;
            for (key, _) in by_expiry.into_iter().take(to_remove) {
                self.entries.remove(&key);
            }
        }
    }
}
