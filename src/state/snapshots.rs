//! Periodic snapshot cache for historical replay.

use crate::types::{FeatureId, FeatureSnapshot, Version};
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroUsize;

/// Bounded cache of full feature states keyed by `(id, version)`.
///
/// Only versions that are multiples of the interval are kept. A per-id index
/// of cached versions tracks the LRU, so an evicted snapshot costs a longer
/// replay and nothing else.
pub struct SnapshotCache {
    interval: u32,
    enabled: bool,
    inner: Mutex<Inner>,
}

struct Inner {
    cache: LruCache<(FeatureId, Version), FeatureSnapshot>,
    versions: HashMap<FeatureId, BTreeSet<Version>>,
}

impl Inner {
    fn forget(&mut self, (id, version): (FeatureId, Version)) {
        if let Some(set) = self.versions.get_mut(&id) {
            set.remove(&version);
            if set.is_empty() {
                self.versions.remove(&id);
            }
        }
    }
}

impl SnapshotCache {
    /// Create a cache. An interval or capacity of 0 disables snapshotting.
    pub fn new(interval: u32, capacity: usize) -> Self {
        let cache_size = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            interval,
            enabled: interval > 0 && capacity > 0,
            inner: Mutex::new(Inner {
                cache: LruCache::new(cache_size),
                versions: HashMap::new(),
            }),
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    fn on_grid(&self, version: Version) -> bool {
        self.enabled && version.0 > 0 && version.0 as u32 % self.interval == 0
    }

    /// Keep `snapshot` if its version falls on the interval grid.
    pub fn record(&self, snapshot: &FeatureSnapshot) -> bool {
        if !self.on_grid(snapshot.version) {
            return false;
        }
        let key = (snapshot.id, snapshot.version);
        let mut inner = self.inner.lock();
        if inner.cache.contains(&key) {
            inner.cache.promote(&key);
            return true;
        }
        if let Some((evicted, _)) = inner.cache.push(key, snapshot.clone()) {
            inner.forget(evicted);
        }
        inner.versions.entry(key.0).or_default().insert(key.1);
        true
    }

    /// Most recent cached snapshot at or below `at`.
    pub fn nearest(&self, id: FeatureId, at: Version) -> Option<FeatureSnapshot> {
        if !self.enabled {
            return None;
        }
        let mut inner = self.inner.lock();
        let version = *inner.versions.get(&id)?.range(..=at).next_back()?;
        inner.cache.get(&(id, version)).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached snapshot.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.cache.clear();
        inner.versions.clear();
    }
}
