use crate::core::descriptors::config::DescriptorConfig;
use crate::core::models::descriptor::DescriptorOutcome;
use crate::core::models::molecule::MoleculeRecord;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Cache key for one (molecule identity, descriptor configuration) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn for_request(record: &MoleculeRecord, config: &DescriptorConfig) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(record.identity().as_bytes());
        hasher.update([0u8]);
        hasher.update(config.canonical_bytes());
        Self(hasher.finalize().into())
    }
}

#[derive(Debug)]
struct CacheEntry {
    outcome: DescriptorOutcome,
    created_at: Instant,
    last_used: AtomicU64,
}

/// Concurrency-safe, write-once descriptor cache with optional LRU bounding.
///
/// Entries are never silently overwritten: the first writer for a key wins
/// and later `put` calls for the same key are no-ops. Reads stay on the read
/// lock; recency is tracked with a per-entry atomic tick so concurrent `get`
/// calls do not serialize against each other.
#[derive(Debug)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    capacity: Option<usize>,
    clock: AtomicU64,
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorCache {
    /// Creates an unbounded cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: None,
            clock: AtomicU64::new(0),
        }
    }

    /// Creates a cache bounded to `capacity` entries (at least 1), evicting
    /// the least-recently-used entry when full.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: Some(capacity.max(1)),
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Looks up a previously recorded outcome. A `get` racing a `put` for the
    /// same key observes either nothing or the fully written outcome.
    pub fn get(&self, key: &CacheKey) -> Option<DescriptorOutcome> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        entry.last_used.store(self.tick(), Ordering::Relaxed);
        Some(entry.outcome.clone())
    }

    /// Records an outcome for a key. Returns `false` without touching the
    /// entry if the key is already present (first writer wins).
    pub fn put(&self, key: CacheKey, outcome: DescriptorOutcome) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(
            key,
            CacheEntry {
                outcome,
                created_at: Instant::now(),
                last_used: AtomicU64::new(self.tick()),
            },
        );

        if let Some(capacity) = self.capacity {
            while entries.len() > capacity {
                let victim = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                    .map(|(key, _)| *key);
                match victim {
                    Some(key) => {
                        entries.remove(&key);
                    }
                    None => break,
                }
            }
        }
        true
    }

    /// Removes a single entry, forcing recomputation on the next request for
    /// that key only.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    /// Age of an entry since it was recorded, if present.
    pub fn age(&self, key: &CacheKey) -> Option<Duration> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|entry| entry.created_at.elapsed())
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
