//! In-process cache store
//!
//! Entries live in a concurrent map and expire lazily: an expired entry is
//! treated as absent and replaced by the next write. Not shared between
//! processes, so it suits tests and single-shot runs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use super::{CacheResult, CacheStore};

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Cache store backed by a shared in-memory map
///
/// Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|entry| entry.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        let found = self
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone());

        if found.is_none() {
            self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        }

        Ok(found)
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let now = Instant::now();
        let fresh = MemoryEntry {
            value: value.to_string(),
            expires_at: now + ttl,
        };

        let created = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    false
                } else {
                    occupied.insert(fresh);
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                true
            }
        };

        debug!(key, created, ttl_ms = ttl.as_millis() as u64, "Cache SET NX (memory)");
        Ok(created)
    }

    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<Duration>> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .and_then(|entry| entry.expires_at.checked_duration_since(now))
            .filter(|left| !left.is_zero()))
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
