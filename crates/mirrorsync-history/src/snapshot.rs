//! Snapshot: an immutable, versioned capture of a collection.

use std::sync::Arc;
use std::time::Instant;

use mirrorsync_core::VersionId;

/// The authoritative collection as it was at one instant.
///
/// Items are shared behind an `Arc`, so cloning a snapshot is cheap and
/// never copies elements.
#[derive(Debug)]
pub struct Snapshot<T> {
    version: VersionId,
    captured_at: Instant,
    items: Arc<[T]>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            captured_at: self.captured_at,
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Snapshot<T> {
    /// Capture `items` under `version`.
    pub fn new(version: VersionId, captured_at: Instant, items: Vec<T>) -> Self {
        Self {
            version,
            captured_at,
            items: items.into(),
        }
    }

    /// The version this snapshot was filed under.
    pub fn version(&self) -> VersionId {
        self.version
    }

    /// When the snapshot was captured.
    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    /// The captured elements.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of captured elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the capture was empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
