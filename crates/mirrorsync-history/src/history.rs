//! The bounded snapshot table.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use mirrorsync_core::VersionId;

use crate::clock::{Clock, SystemClock};
use crate::retention::{BaselineMode, EvictionMode, RetentionPolicy};
use crate::snapshot::Snapshot;

/// Recent snapshots keyed by version, ordered by insertion.
///
/// Thread-safe via an internal mutex. Each public method takes the lock
/// once and releases it before returning.
pub struct SnapshotHistory<T> {
    clock: Arc<dyn Clock>,
    inner: Mutex<HistoryInner<T>>,
}

struct HistoryInner<T> {
    retention: RetentionPolicy,

    /// Monotonic insertion counter; never wraps in practice.
    next_slot: u64,

    /// Snapshots in insertion order. The first entry is the eldest.
    slots: BTreeMap<u64, Snapshot<T>>,

    /// Version -> slot.
    index: HashMap<VersionId, u64>,
}

impl<T> SnapshotHistory<T> {
    /// Create an empty history on the system clock.
    pub fn new(retention: RetentionPolicy) -> Self {
        Self::with_clock(retention, Arc::new(SystemClock))
    }

    /// Create an empty history on a custom clock.
    pub fn with_clock(retention: RetentionPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(HistoryInner {
                retention,
                next_slot: 0,
                slots: BTreeMap::new(),
                index: HashMap::new(),
            }),
        }
    }

    /// Current time on this history's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Look up the snapshot filed under `version`.
    ///
    /// Under [`BaselineMode::Take`] the entry is removed in the same locked
    /// step. The sentinel never matches.
    pub fn lookup(&self, version: VersionId) -> Option<Snapshot<T>> {
        if version.is_sentinel() {
            return None;
        }

        let mut inner = self.lock();
        let found = match inner.retention.baseline {
            BaselineMode::Take => inner.remove(version),
            BaselineMode::Keep => inner
                .index
                .get(&version)
                .and_then(|slot| inner.slots.get(slot))
                .cloned(),
        };

        if found.is_none() {
            tracing::trace!(%version, "baseline not in history");
        }
        found
    }

    /// Remove and return the snapshot filed under `version`.
    pub fn take(&self, version: VersionId) -> Option<Snapshot<T>> {
        self.lock().remove(version)
    }

    /// File `snapshot` under its version, then apply retention.
    ///
    /// Returns the versions evicted by this call. A snapshot already filed
    /// under the same version is replaced.
    pub fn insert(&self, snapshot: Snapshot<T>) -> Vec<VersionId> {
        let now = self.clock.now();
        let mut inner = self.lock();

        let version = snapshot.version();
        inner.remove(version);

        let slot = inner.next_slot;
        inner.next_slot += 1;
        inner.slots.insert(slot, snapshot);
        inner.index.insert(version, slot);

        let evicted = inner.evict(now);
        for version in &evicted {
            tracing::debug!(%version, remaining = inner.slots.len(), "evicted snapshot");
        }
        evicted
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// Check if no snapshots are retained.
    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }

    /// Check if a snapshot is filed under `version`.
    pub fn contains(&self, version: VersionId) -> bool {
        self.lock().index.contains_key(&version)
    }

    /// Retained versions, eldest first.
    pub fn versions(&self) -> Vec<VersionId> {
        self.lock().slots.values().map(Snapshot::version).collect()
    }

    /// The active retention policy.
    pub fn retention(&self) -> RetentionPolicy {
        self.lock().retention
    }

    /// Replace the retention policy.
    ///
    /// Nothing is evicted here; the new bounds apply from the next insert.
    pub fn set_retention(&self, retention: RetentionPolicy) {
        self.lock().retention = retention;
    }

    /// Drop every snapshot.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.slots.clear();
        inner.index.clear();
    }

    fn lock(&self) -> MutexGuard<'_, HistoryInner<T>> {
        // Every mutation leaves the table consistent; poisoning is ignored.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> HistoryInner<T> {
    fn remove(&mut self, version: VersionId) -> Option<Snapshot<T>> {
        let slot = self.index.remove(&version)?;
        self.slots.remove(&slot)
    }

    fn evict(&mut self, now: Instant) -> Vec<VersionId> {
        let mut evicted = Vec::new();

        loop {
            let len = self.slots.len();
            let Some(eldest) = self.slots.first_entry() else {
                break;
            };
            let age = now.saturating_duration_since(eldest.get().captured_at());
            if !self.retention.should_evict(len, age) {
                break;
            }

            let snapshot = eldest.remove();
            self.index.remove(&snapshot.version());
            evicted.push(snapshot.version());

            if self.retention.eviction == EvictionMode::Eldest {
                break;
            }
        }

        evicted
    }
}
