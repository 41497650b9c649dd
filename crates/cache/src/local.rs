//! In-process TTL cache of resolved channel sets, keyed by user id.
//! Sits in front of the registration store and channel registry so that a
//! burst of filter changes on the dashboard does not repeat the lookups.

use creator_core::types::ResolvedChannels;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry {
    resolved: ResolvedChannels,
    inserted_at: Instant,
}

/// Lock-free cache of channel resolutions.
pub struct ResolutionCache {
    store: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResolutionCache {
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            store: Arc::new(DashMap::with_capacity(max_entries.min(1024))),
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        }
    }

    /// A zero TTL turns every operation into a no-op.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero() && self.max_entries > 0
    }

    /// Returns None if expired or missing.
    pub fn get(&self, user_id: &str) -> Option<ResolvedChannels> {
        if !self.is_enabled() {
            return None;
        }
        let Some(entry) = self.store.get(user_id) else {
            metrics::counter!("cache.resolution.miss").increment(1);
            return None;
        };
        if entry.inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.store.remove(user_id);
            metrics::counter!("cache.resolution.expired").increment(1);
            return None;
        }
        metrics::counter!("cache.resolution.hit").increment(1);
        Some(entry.resolved.clone())
    }

    pub fn put(&self, user_id: String, resolved: ResolvedChannels) {
        if !self.is_enabled() {
            return;
        }
        // Over capacity: skip the insert, evict_expired will make room
        if self.store.len() >= self.max_entries && !self.store.contains_key(&user_id) {
            debug!(user_id = %user_id, "Resolution cache full, skipping insert");
            return;
        }
        self.store.insert(
            user_id,
            CacheEntry {
                resolved,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop a user's entry, e.g. after their registration changes.
    pub fn invalidate(&self, user_id: &str) {
        self.store.remove(user_id);
    }

    /// Remove expired entries. Call this periodically from a background task.
    /// Returns how many entries this call removed; concurrent inserts do not
    /// affect the count.
    pub fn evict_expired(&self) -> usize {
        let mut evicted = 0;
        self.store.retain(|_, entry| {
            let fresh = entry.inserted_at.elapsed() <= self.ttl;
            if !fresh {
                evicted += 1;
            }
            fresh
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
