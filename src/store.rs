//! Main FeatureStore struct tying the state machine, replay and snapshot
//! cache together.

use crate::error::{Result, StoreError};
use crate::events::Event;
use crate::state::{self, apply_event, FeatureState, SnapshotCache};
use crate::types::{FeatureId, FeatureSnapshot, FeatureStatus, StoreStats, Version};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Snapshot every N versions of a feature (0 disables snapshots).
    pub snapshot_interval: u32,

    /// Maximum number of cached snapshots across all features.
    pub snapshot_cache_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 64,
            snapshot_cache_capacity: 4096,
        }
    }
}

impl StoreConfig {
    pub fn with_snapshot_interval(mut self, interval: u32) -> Self {
        self.snapshot_interval = interval;
        self
    }

    pub fn with_snapshot_cache_capacity(mut self, capacity: usize) -> Self {
        self.snapshot_cache_capacity = capacity;
        self
    }
}

/// State and accepted history of one feature id.
#[derive(Default)]
struct FeatureEntry {
    state: FeatureState,
    /// `history[i]` is the accepted event with version `i + 1`.
    history: Vec<Event>,
}

/// The feature store.
///
/// Each feature id has its own lock. Events for one id are applied one at a
/// time in version order; events for different ids proceed in parallel. The
/// table lock is only held to find or insert an entry.
pub struct FeatureStore {
    config: StoreConfig,

    features: RwLock<HashMap<FeatureId, Arc<Mutex<FeatureEntry>>>>,

    snapshots: SnapshotCache,
}

impl FeatureStore {
    pub fn new(config: StoreConfig) -> Self {
        let snapshots =
            SnapshotCache::new(config.snapshot_interval, config.snapshot_cache_capacity);
        Self {
            config,
            features: RwLock::new(HashMap::new()),
            snapshots,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn entry(&self, id: FeatureId) -> Option<Arc<Mutex<FeatureEntry>>> {
        self.features.read().get(&id).cloned()
    }

    fn entry_or_insert(&self, id: FeatureId) -> Arc<Mutex<FeatureEntry>> {
        if let Some(entry) = self.entry(id) {
            return entry;
        }
        Arc::clone(self.features.write().entry(id).or_default())
    }

    // --- Event Application ---

    /// Apply one event and return the feature state it produced.
    ///
    /// A rejected event leaves the feature exactly as it was. For a deletion
    /// the returned snapshot carries [`FeatureStatus::Deleted`].
    pub fn apply(&self, event: Event) -> Result<FeatureSnapshot> {
        let id = event.id();
        match event {
            Event::Creation(_) => {
                let entry = self.entry_or_insert(id);
                let result = self.apply_to(&entry, event);
                if result.is_err() {
                    self.discard_if_absent(id, entry);
                }
                result
            }
            _ => {
                let entry = self.entry(id).ok_or(StoreError::UnknownFeature(id))?;
                self.apply_to(&entry, event)
            }
        }
    }

    /// Drop an entry left behind by a rejected creation.
    ///
    /// The entry is only removed while the table and `entry` are its sole
    /// holders; a concurrent creation holding its own handle keeps it alive
    /// and cleans up after itself if it fails too.
    fn discard_if_absent(&self, id: FeatureId, entry: Arc<Mutex<FeatureEntry>>) {
        let mut features = self.features.write();
        let sole_holder = Arc::strong_count(&entry) == 2
            && features.get(&id).is_some_and(|e| Arc::ptr_eq(e, &entry));
        if sole_holder && matches!(entry.lock().state, FeatureState::Absent) {
            features.remove(&id);
        }
        // dropped under the table lock so a racing cleanup sees the final count
        drop(entry);
    }

    fn apply_to(&self, entry: &Mutex<FeatureEntry>, event: Event) -> Result<FeatureSnapshot> {
        let id = event.id();
        let mut entry = entry.lock();

        let next = apply_event(&entry.state, &event).map_err(|e| {
            debug!(
                feature = %id,
                version = %event.version(),
                error = %e,
                "rejected {} event",
                event.kind_name()
            );
            e
        })?;

        // Every non-absent state carries a snapshot; Absent never follows a
        // successful transition.
        let snapshot = next
            .snapshot()
            .cloned()
            .ok_or(StoreError::UnknownFeature(id))?;

        debug!(feature = %id, version = %snapshot.version, "applied {} event", event.kind_name());

        entry.state = next;
        entry.history.push(event);

        if self.snapshots.record(&snapshot) {
            debug!(feature = %id, version = %snapshot.version, "cached snapshot");
        }

        Ok(snapshot)
    }

    // --- Queries ---

    /// Current state of a live feature. `None` when absent or deleted.
    pub fn current_state(&self, id: FeatureId) -> Option<FeatureSnapshot> {
        let entry = self.entry(id)?;
        let entry = entry.lock();
        match &entry.state {
            FeatureState::Live(snapshot) => Some(snapshot.clone()),
            _ => None,
        }
    }

    /// Reconstruct a feature as it was at `version`.
    ///
    /// Replay starts from the nearest cached snapshot at or below `version`,
    /// or from the creation event when none is cached.
    pub fn state_at_version(&self, id: FeatureId, version: Version) -> Result<FeatureSnapshot> {
        let entry = self.entry(id).ok_or(StoreError::UnknownFeature(id))?;
        let entry = entry.lock();

        let latest = entry
            .state
            .snapshot()
            .ok_or(StoreError::UnknownFeature(id))?;

        if version < Version::INITIAL || version > latest.version {
            return Err(StoreError::VersionConflict {
                id,
                expected: latest.version,
                got: version,
            });
        }
        if version == latest.version {
            return Ok(latest.clone());
        }

        let base = self.snapshots.nearest(id, version);
        debug!(
            feature = %id,
            target = %version,
            base = ?base.as_ref().map(|s| s.version),
            "replaying history"
        );

        let replayed = state::replay(&entry.history, base, version, |s| {
            self.snapshots.record(s);
        })?;

        replayed
            .snapshot()
            .cloned()
            .ok_or(StoreError::UnknownFeature(id))
    }

    pub fn status(&self, id: FeatureId) -> Option<FeatureStatus> {
        self.entry(id)?.lock().state.status()
    }

    /// Latest accepted version, including the deletion version.
    pub fn latest_version(&self, id: FeatureId) -> Option<Version> {
        self.entry(id)?.lock().state.version()
    }

    /// Accepted events for a feature in version order.
    pub fn history(&self, id: FeatureId) -> Vec<Event> {
        let Some(entry) = self.entry(id) else {
            return Vec::new();
        };
        let history = entry.lock().history.clone();
        history
    }

    /// Ids of every feature that has been created, sorted.
    pub fn feature_ids(&self) -> Vec<FeatureId> {
        let entries: Vec<_> = self
            .features
            .read()
            .iter()
            .map(|(id, entry)| (*id, Arc::clone(entry)))
            .collect();

        let mut ids: Vec<FeatureId> = entries
            .into_iter()
            .filter(|(_, entry)| entry.lock().state.status().is_some())
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids
    }

    // --- Snapshots ---

    /// Number of snapshots currently cached.
    pub fn cached_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    /// Drop every cached snapshot. Reconstruction results are unaffected.
    pub fn clear_snapshots(&self) {
        self.snapshots.clear();
    }

    // --- Stats ---

    pub fn stats(&self) -> StoreStats {
        let entries: Vec<_> = self.features.read().values().cloned().collect();

        let mut stats = StoreStats::default();
        for entry in entries {
            let entry = entry.lock();
            match entry.state.status() {
                Some(FeatureStatus::Live) => stats.live_count += 1,
                Some(FeatureStatus::Deleted) => stats.deleted_count += 1,
                None => continue,
            }
            stats.feature_count += 1;
            stats.event_count += entry.history.len() as u64;
        }
        stats.cached_snapshots = self.snapshots.len() as u64;
        stats
    }
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
