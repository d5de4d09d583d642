//! Best-effort domain lookup cache.
//!
//! Read-through cache for per-domain lookups (registrar/abuse contact
//! data fetched by an external collaborator). 30-day TTL, capped at 500
//! entries with oldest-first eviction. Never a correctness dependency:
//! a miss just means the caller performs the lookup again.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Default entry cap
pub const DEFAULT_CAPACITY: usize = 500;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// TTL + capacity bounded cache keyed by domain
pub struct DomainCache<V> {
    entries: HashMap<String, Entry<V>>,
    ttl: Duration,
    capacity: usize,
}

impl<V> Default for DomainCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl<V> DomainCache<V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity,
        }
    }

    /// Get a live entry, dropping it if expired
    pub fn get(&mut self, domain: &str) -> Option<&V> {
        let expired = match self.entries.get(domain) {
            Some(entry) => entry.inserted_at.elapsed() > self.ttl,
            None => return None,
        };

        if expired {
            self.entries.remove(domain);
            return None;
        }

        self.entries.get(domain).map(|e| &e.value)
    }

    /// Insert a value, evicting the oldest entry when at capacity
    pub fn insert(&mut self, domain: impl Into<String>, value: V) {
        let domain = domain.into();

        if !self.entries.contains_key(&domain) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(key) = oldest {
                self.entries.remove(&key);
            }
        }

        self.entries.insert(
            domain,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
