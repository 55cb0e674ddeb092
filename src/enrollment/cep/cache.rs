use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::CepCategory;

pub const DEFAULT_CAPACITY: usize = 50;
const DEFAULT_TTL_SECONDS: i64 = 5 * 60;

/// Bounded cache for resolved CEP categories.
///
/// The collaborator service this replaces kept a module-level map; here the
/// cache is an explicit component the caller owns and injects. Capacity is
/// enforced by evicting the oldest entry, and entries expire after a fixed
/// TTL. The clock is always passed in, so the cache stays deterministic
/// under test.
#[derive(Debug, Clone)]
pub struct CepCache {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    category: CepCategory,
    inserted_at: DateTime<Utc>,
}

impl CepCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_ttl(capacity, Duration::seconds(DEFAULT_TTL_SECONDS))
    }

    pub fn with_ttl(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch a cached category; expired entries count as misses.
    pub fn get(&self, cep: &str, now: DateTime<Utc>) -> Option<CepCategory> {
        let entry = self.entries.get(cep)?;
        if now - entry.inserted_at >= self.ttl {
            return None;
        }
        Some(entry.category)
    }

    /// Store a resolution, evicting the oldest entry once over capacity.
    pub fn insert(&mut self, cep: String, category: CepCategory, now: DateTime<Utc>) {
        self.entries.insert(
            cep,
            CacheEntry {
                category,
                inserted_at: now,
            },
        );

        while self.entries.len() > self.capacity {
            self.evict_oldest();
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

impl Default for CepCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
